pub mod output;

pub use output::{OutputDestination, OutputOptions, collected_to_value, emit};
