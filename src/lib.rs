#![deny(rust_2018_idioms)]

mod domain;
mod draft;
mod form;
mod io;
mod runtime;
mod ui;
mod widget;

#[cfg(test)]
mod tests;

pub use domain::{
    AddressError, FOOTAGE_RETENTION_DAYS, FieldKey, FieldKind, FieldSpec, FormSpec, GroupSpec,
    ItemSpec, RECOVERY_FORM_ID, Requirement, Rule, Scope, Visibility, recovery_request,
};
pub use draft::{
    Autosaver, DRAFT_TTL_HOURS, DraftSnapshot, DraftStore, FileDraftStore, MemoryDraftStore,
    RestoreReport, SNAPSHOT_VERSION,
};
pub use form::{
    AUTOSAVE_INTERVAL, DraftError, EngineOutcome, FieldIssue, FieldState, FieldValue, FormCommand,
    FormEngine, FormState, StructuralError, TickOutcome, ValidationKind, ValidationReport,
    Validator,
};
pub use io::{OutputDestination, OutputOptions, collected_to_value, emit};
pub use runtime::{FormUi, UiOptions};
pub use widget::{BindingPhase, DateTimePicker, PickerFactory, PickerRegistry, SimulatedPicker};

pub mod prelude {
    pub use super::{
        FormCommand, FormEngine, FormUi, PickerRegistry, UiOptions, recovery_request,
    };
}
