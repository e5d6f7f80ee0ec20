use crate::domain::FieldKey;
use crate::form::StructuralError;
use crate::tests::support;

#[test]
fn new_form_has_one_group_with_one_item() {
    let (form, _registry) = support::state();
    assert_eq!(form.group_count(), 1);
    assert_eq!(form.item_count(0), Some(1));
}

#[test]
fn two_level_structure_yields_the_documented_addresses() {
    let (mut form, mut registry) = support::state();
    assert_eq!(form.add_group(&mut registry), 1);
    assert_eq!(form.add_item(0, &mut registry).unwrap(), 1);

    let in_first_group = form
        .field(&FieldKey::item("cameraDetails", 0, 1))
        .expect("second time-frame of group 0");
    assert_eq!(in_first_group.key.address(), "cameraDetails_1");

    let in_second_group = form
        .field(&FieldKey::item("cameraDetails", 1, 0))
        .expect("first time-frame of group 1");
    assert_eq!(in_second_group.key.address(), "cameraDetails_g1");
}

#[test]
fn first_group_and_first_item_are_not_removable() {
    let (mut form, mut registry) = support::state();
    form.add_group(&mut registry);
    assert_eq!(
        form.remove_group(0, &mut registry),
        Err(StructuralError::RemoveFirstGroup)
    );
    assert_eq!(
        form.remove_item(0, 0, &mut registry),
        Err(StructuralError::RemoveFirstItem { group: 0 })
    );
    assert_eq!(
        form.remove_group(5, &mut registry),
        Err(StructuralError::NoSuchGroup(5))
    );
    assert_eq!(
        form.remove_item(1, 3, &mut registry),
        Err(StructuralError::NoSuchItem { group: 1, item: 3 })
    );
}

#[test]
fn removing_a_middle_group_renumbers_successors_without_losing_data() {
    let (mut form, mut registry) = support::state();
    form.add_group(&mut registry);
    form.add_group(&mut registry);

    for (group, password) in [(0, "P0"), (1, "P1"), (2, "P2")] {
        form.field_mut(&FieldKey::group("dvrPassword", group))
            .unwrap()
            .set_text(password);
    }

    form.remove_group(1, &mut registry).unwrap();

    assert_eq!(form.group_count(), 2);
    let kept = form.field(&FieldKey::group("dvrPassword", 0)).unwrap();
    assert_eq!(kept.key.address(), "dvrPassword");
    assert_eq!(kept.raw_value(), "P0");
    let shifted = form.field(&FieldKey::group("dvrPassword", 1)).unwrap();
    assert_eq!(shifted.key.address(), "dvrPassword_g1");
    assert_eq!(shifted.raw_value(), "P2");
    assert!(form.field(&FieldKey::group("dvrPassword", 2)).is_none());
}

#[test]
fn removing_a_group_rebinds_picker_values_to_the_new_addresses() {
    let (mut form, mut registry) = support::state();
    form.add_group(&mut registry);
    form.add_group(&mut registry);

    registry.write(&FieldKey::item("startTime", 1, 0), "2024-06-01T08:00");
    registry.write(&FieldKey::item("startTime", 2, 0), "2024-06-02T08:00");

    form.remove_group(1, &mut registry).unwrap();

    assert_eq!(
        registry.settled_value(&FieldKey::item("startTime", 1, 0)),
        Some("2024-06-02T08:00".to_string())
    );
    assert_eq!(registry.settled_value(&FieldKey::item("startTime", 2, 0)), None);
}

#[test]
fn removing_an_item_shifts_later_items_within_that_group_only() {
    let (mut form, mut registry) = support::state();
    form.add_group(&mut registry);
    form.add_item(0, &mut registry).unwrap();
    form.add_item(0, &mut registry).unwrap();
    form.add_item(1, &mut registry).unwrap();

    for (item, details) in [(0, "D0"), (1, "D1"), (2, "D2")] {
        form.field_mut(&FieldKey::item("cameraDetails", 0, item))
            .unwrap()
            .set_text(details);
    }
    form.field_mut(&FieldKey::item("cameraDetails", 1, 1))
        .unwrap()
        .set_text("other-group");

    form.remove_item(0, 1, &mut registry).unwrap();

    assert_eq!(form.item_count(0), Some(2));
    assert_eq!(
        form.field(&FieldKey::item("cameraDetails", 0, 0))
            .unwrap()
            .raw_value(),
        "D0"
    );
    assert_eq!(
        form.field(&FieldKey::item("cameraDetails", 0, 1))
            .unwrap()
            .raw_value(),
        "D2"
    );
    // The sibling group is untouched.
    assert_eq!(form.item_count(1), Some(2));
    assert_eq!(
        form.field(&FieldKey::item("cameraDetails", 1, 1))
            .unwrap()
            .raw_value(),
        "other-group"
    );
}

#[test]
fn reset_collapses_to_the_minimum_structure() {
    let (mut form, mut registry) = support::state();
    form.add_group(&mut registry);
    form.add_item(0, &mut registry).unwrap();
    form.field_mut(&FieldKey::form("officerName"))
        .unwrap()
        .set_text("J. Reyes");

    form.reset(&mut registry);

    assert_eq!(form.group_count(), 1);
    assert_eq!(form.item_count(0), Some(1));
    assert!(form.field(&FieldKey::form("officerName")).unwrap().is_empty());
    assert!(registry.settled_value(&FieldKey::item("startTime", 0, 0)).is_some());
}
