use std::time::{Duration, Instant};

use crate::domain::FieldKey;
use crate::form::{AUTOSAVE_INTERVAL, EngineOutcome, FormCommand, TEXT_DEBOUNCE};
use crate::tests::support;

#[test]
fn submit_with_missing_fields_is_blocked_and_reports_first_invalid() {
    let mut engine = support::engine();
    match engine.dispatch(FormCommand::Submit, Instant::now()) {
        EngineOutcome::Blocked {
            issues,
            first_invalid,
        } => {
            assert_eq!(issues, 14);
            assert_eq!(first_invalid, Some(FieldKey::form("officerName")));
        }
        other => panic!("expected Blocked, got {other:?}"),
    }
    // Nothing was cleared by the failed attempt.
    assert_eq!(engine.form().group_count(), 1);
}

#[test]
fn valid_submit_yields_the_collected_map_and_clears_the_form() {
    let mut engine = support::engine();
    support::fill_minimum_valid(&mut engine);

    let values = match engine.dispatch(FormCommand::Submit, Instant::now()) {
        EngineOutcome::Submitted(values) => values,
        other => panic!("expected Submitted, got {other:?}"),
    };

    assert_eq!(values.get("officerName").map(String::as_str), Some("J. Reyes"));
    assert_eq!(
        values.get("startTime").map(String::as_str),
        Some("2024-06-10T09:00")
    );
    assert_eq!(values.get("dvrPassword").map(String::as_str), Some(""));
    // Hidden conditionals are not part of the wire map.
    assert!(!values.contains_key("timeOffset"));
    assert!(!values.contains_key("dvrMakeOther"));

    // Successful submission clears values and structure.
    assert_eq!(engine.form().group_count(), 1);
    assert!(
        engine
            .form()
            .field(&FieldKey::form("officerName"))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn collected_addresses_cover_the_whole_structure() {
    let mut engine = support::engine();
    support::fill_minimum_valid(&mut engine);
    let start = Instant::now();
    engine.dispatch(FormCommand::AddGroup, start);
    engine.dispatch(FormCommand::AddItem { group: 1 }, start);
    support::edit_text(&mut engine, FieldKey::group("dvrLocation", 1), "Lobby");
    support::edit_text(
        &mut engine,
        FieldKey::item("cameraDetails", 1, 1),
        "Camera 12",
    );

    let values = engine.collect();
    assert_eq!(values.get("dvrLocation_g1").map(String::as_str), Some("Lobby"));
    assert_eq!(
        values.get("cameraDetails_g1_1").map(String::as_str),
        Some("Camera 12")
    );
    assert!(values.contains_key("startTime_g1"));
    assert!(values.contains_key("startTime_g1_1"));
}

#[test]
fn free_text_validation_waits_for_the_debounce() {
    let mut engine = support::engine();
    let start = Instant::now();
    let email = FieldKey::form("officerEmail");
    engine.dispatch(
        FormCommand::EditText {
            key: email.clone(),
            text: "not-an-email".to_string(),
        },
        start,
    );
    assert!(engine.form().field(&email).unwrap().error.is_none());

    let tick = engine.tick(start + TEXT_DEBOUNCE + Duration::from_millis(10));
    assert_eq!(tick.validated, Some(email.clone()));
    assert!(engine.form().field(&email).unwrap().error.is_some());
}

#[test]
fn blur_validates_immediately() {
    let mut engine = support::engine();
    let start = Instant::now();
    let email = FieldKey::form("officerEmail");
    engine.dispatch(
        FormCommand::EditText {
            key: email.clone(),
            text: "not-an-email".to_string(),
        },
        start,
    );
    engine.dispatch(FormCommand::Blur { key: email.clone() }, start);
    assert!(engine.form().field(&email).unwrap().error.is_some());
}

#[test]
fn selecting_other_reveals_the_make_field_through_dispatch() {
    let mut engine = support::engine();
    let make = FieldKey::group("dvrMake", 0);
    let other = FieldKey::group("dvrMakeOther", 0);

    assert!(!engine.form().field(&other).unwrap().visible);
    support::select(&mut engine, make.clone(), 4);
    assert!(engine.form().field(&other).unwrap().visible);
    support::select(&mut engine, make, 1);
    assert!(!engine.form().field(&other).unwrap().visible);
}

#[test]
fn edits_arm_the_autosave_deadline() {
    let mut engine = support::engine();
    let start = Instant::now();
    assert!(!engine.tick(start).autosave_due);

    engine.dispatch(
        FormCommand::EditText {
            key: FieldKey::form("officerName"),
            text: "J".to_string(),
        },
        start,
    );
    assert!(engine.is_dirty());
    assert!(!engine.tick(start).autosave_due);
    assert!(
        engine
            .tick(start + AUTOSAVE_INTERVAL + Duration::from_millis(10))
            .autosave_due
    );

    engine.mark_saved();
    assert!(!engine.is_dirty());
    assert!(
        !engine
            .tick(start + AUTOSAVE_INTERVAL + Duration::from_millis(20))
            .autosave_due
    );
}

#[test]
fn reset_returns_to_a_clean_minimum_form() {
    let mut engine = support::engine();
    support::fill_minimum_valid(&mut engine);
    engine.dispatch(FormCommand::AddGroup, Instant::now());

    engine.dispatch(FormCommand::Reset, Instant::now());
    assert_eq!(engine.form().group_count(), 1);
    assert_eq!(engine.progress(), 0);
    assert!(
        engine
            .form()
            .field(&FieldKey::item("cameraDetails", 0, 0))
            .unwrap()
            .is_empty()
    );
}
