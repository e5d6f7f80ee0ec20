use crate::domain::FieldKey;
use crate::widget::{BindingPhase, DateTimePicker, PickerRegistry, SimulatedPicker};

fn key(item: usize) -> FieldKey {
    FieldKey::item("startTime", 0, item)
}

#[test]
fn simulated_picker_stages_writes_until_flushed() {
    let mut picker = SimulatedPicker::new();
    picker.set_value("2024-06-10T09:00");
    // A read straight after the change event still sees the old value.
    assert_eq!(picker.value(), "");
    assert!(picker.has_staged());
    picker.flush();
    assert_eq!(picker.value(), "2024-06-10T09:00");
    assert!(!picker.has_staged());
}

#[test]
fn writes_before_initialization_are_queued_and_applied() {
    let mut registry = PickerRegistry::new();
    registry.register(key(0));
    assert_eq!(registry.phase(&key(0)), Some(BindingPhase::Uninitialized));

    registry.write(&key(0), "2024-06-10T09:00");
    assert_eq!(registry.phase(&key(0)), Some(BindingPhase::Uninitialized));
    // The queued value is already observable through the settled read.
    assert_eq!(
        registry.settled_value(&key(0)),
        Some("2024-06-10T09:00".to_string())
    );

    registry.initialize_pending();
    assert_eq!(registry.phase(&key(0)), Some(BindingPhase::Bound));
    assert_eq!(
        registry.settled_value(&key(0)),
        Some("2024-06-10T09:00".to_string())
    );
}

#[test]
fn settled_reads_never_observe_a_stale_value() {
    let mut registry = PickerRegistry::new();
    registry.register(key(0));
    registry.initialize_pending();

    registry.write(&key(0), "2024-06-10T09:00");
    // The raw widget value lags until the write settles.
    assert_eq!(registry.raw_value(&key(0)), Some(String::new()));
    assert_eq!(
        registry.settled_value(&key(0)),
        Some("2024-06-10T09:00".to_string())
    );
    assert_eq!(
        registry.raw_value(&key(0)),
        Some("2024-06-10T09:00".to_string())
    );
}

#[test]
fn clear_goes_through_the_widget_api() {
    let mut registry = PickerRegistry::new();
    registry.register(key(0));
    registry.initialize_pending();
    registry.write(&key(0), "2024-06-10T09:00");
    registry.settle();

    registry.clear(&key(0));
    assert_eq!(registry.phase(&key(0)), Some(BindingPhase::Ready));
    assert_eq!(registry.settled_value(&key(0)), Some(String::new()));
}

#[test]
fn rekey_moves_bindings_in_one_pass() {
    let mut registry = PickerRegistry::new();
    for item in 0..3 {
        registry.register(key(item));
    }
    registry.initialize_pending();
    for item in 0..3 {
        registry.write(&key(item), &format!("2024-06-0{}T08:00", item + 1));
    }

    // Drop item 1 and shift item 2 down, as the lifecycle manager would.
    registry.remove(&key(1));
    registry.rekey(&[(key(2), key(1))]);

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.settled_value(&key(0)),
        Some("2024-06-01T08:00".to_string())
    );
    assert_eq!(
        registry.settled_value(&key(1)),
        Some("2024-06-03T08:00".to_string())
    );
    assert_eq!(registry.settled_value(&key(2)), None);
}

#[test]
fn unregistered_writes_are_ignored_not_fatal() {
    let mut registry = PickerRegistry::new();
    registry.write(&key(9), "2024-06-10T09:00");
    assert_eq!(registry.settled_value(&key(9)), None);
    assert!(registry.is_empty());
}
