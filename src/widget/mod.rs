mod adapter;
mod picker;

pub use adapter::{BindingPhase, PickerFactory, PickerRegistry};
pub use picker::{DateTimePicker, SimulatedPicker};
