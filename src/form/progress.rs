use crate::domain::FieldKey;
use crate::widget::PickerRegistry;

use super::{state::FormState, validation::Validator};

/// Percentage of currently-required fields holding a valid value, as an
/// integer 0..=100. Recomputed after every structural or required-ness
/// change, not just value edits. A form with nothing required reports 100.
pub fn percent(validator: &Validator, form: &FormState, registry: &mut PickerRegistry) -> u8 {
    let keys: Vec<FieldKey> = form.fields().map(|field| field.key.clone()).collect();
    let mut required = 0usize;
    let mut filled = 0usize;
    for key in keys {
        if !validator.required_now(form, &key) {
            continue;
        }
        required += 1;
        if validator.check_field(form, &key, registry).is_none() {
            filled += 1;
        }
    }
    if required == 0 {
        return 100;
    }
    ((filled * 100) / required) as u8
}
