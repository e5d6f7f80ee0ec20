mod actions;
mod error;
mod field;
mod group;
pub mod progress;
mod reducers;
mod state;
mod validation;

pub use actions::FormCommand;
pub use error::{DraftError, FieldIssue, StructuralError, ValidationKind};
pub use field::{FieldState, FieldValue};
pub use group::{GroupState, ItemState};
pub use reducers::{AUTOSAVE_INTERVAL, EngineOutcome, FormEngine, TickOutcome};
pub use state::FormState;
pub use validation::{
    DATE_FORMAT, DATE_TIME_FORMAT, Debouncer, TEXT_DEBOUNCE, ValidationReport, Validator,
};
