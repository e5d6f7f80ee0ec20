use std::time::Instant;

use chrono::{Duration, TimeZone, Utc};

use crate::domain::FieldKey;
use crate::draft::{DraftSnapshot, SNAPSHOT_VERSION};
use crate::form::{DraftError, FormCommand};
use crate::tests::support;

fn saved_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

#[test]
fn serialize_records_structure_values_and_open_sections() {
    let mut engine = support::engine();
    support::fill_minimum_valid(&mut engine);
    let start = Instant::now();
    engine.dispatch(FormCommand::AddGroup, start);
    engine.dispatch(FormCommand::AddItem { group: 0 }, start);
    support::select(&mut engine, FieldKey::group("timeCorrect", 0), 1);
    support::edit_text(&mut engine, FieldKey::group("timeOffset", 0), "-90");

    let snapshot = engine.serialize_draft(saved_at(), Duration::hours(72));

    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert_eq!(snapshot.items_per_group, vec![2, 1]);
    assert_eq!(snapshot.expires_at, saved_at() + Duration::hours(72));
    assert_eq!(
        snapshot.values.get("timeOffset").map(String::as_str),
        Some("-90")
    );
    assert_eq!(
        snapshot.values.get("startTime").map(String::as_str),
        Some("2024-06-10T09:00")
    );
    assert!(snapshot.values.contains_key("cameraDetails_1"));
    assert!(snapshot.values.contains_key("dvrLocation_g1"));
    assert!(
        snapshot
            .open_sections
            .contains(&"timeOffset".to_string())
    );
}

#[test]
fn restore_round_trips_structure_and_values() {
    let mut engine = support::engine();
    support::fill_minimum_valid(&mut engine);
    let start = Instant::now();
    engine.dispatch(FormCommand::AddGroup, start);
    engine.dispatch(FormCommand::AddItem { group: 1 }, start);
    support::edit_text(&mut engine, FieldKey::group("dvrLocation", 1), "Lobby");
    support::set_picker(
        &mut engine,
        FieldKey::item("startTime", 1, 1),
        "2024-06-11T14:00",
    );
    let original = engine.collect();
    let snapshot = engine.serialize_draft(saved_at(), Duration::hours(72));

    let mut rebuilt = support::engine();
    let report = rebuilt.restore_draft(&snapshot).expect("restore succeeds");

    assert_eq!(report.groups, 2);
    assert_eq!(report.items_per_group, vec![1, 2]);
    assert_eq!(rebuilt.form().group_count(), 2);
    assert_eq!(rebuilt.form().item_count(1), Some(2));
    assert_eq!(rebuilt.collect(), original);
    // The restored picker value lives in the widget, not just the mirror.
    assert_eq!(
        rebuilt
            .registry_mut()
            .settled_value(&FieldKey::item("startTime", 1, 1)),
        Some("2024-06-11T14:00".to_string())
    );
}

#[test]
fn restore_reapplies_conditional_visibility_and_validity() {
    let mut engine = support::engine();
    support::select(&mut engine, FieldKey::group("timeCorrect", 0), 1);
    support::edit_text(&mut engine, FieldKey::group("timeOffset", 0), "badvalue");
    let snapshot = engine.serialize_draft(saved_at(), Duration::hours(72));

    let mut rebuilt = support::engine();
    let report = rebuilt.restore_draft(&snapshot).expect("restore succeeds");

    let offset = rebuilt
        .form()
        .field(&FieldKey::group("timeOffset", 0))
        .unwrap();
    assert!(offset.visible);
    assert_eq!(offset.raw_value(), "badvalue");
    // The final validation pass flagged the restored junk.
    assert!(offset.error.is_some());
    assert!(report.issues > 0);
}

#[test]
fn round_trip_preserves_counts_across_sizes() {
    for groups in 1..=3usize {
        for items in 1..=3usize {
            let mut engine = support::engine();
            let start = Instant::now();
            for _ in 1..groups {
                engine.dispatch(FormCommand::AddGroup, start);
            }
            for group in 0..groups {
                for _ in 1..items {
                    engine.dispatch(FormCommand::AddItem { group }, start);
                }
            }
            let snapshot = engine.serialize_draft(saved_at(), Duration::hours(1));
            assert_eq!(snapshot.items_per_group, vec![items; groups]);

            let mut rebuilt = support::engine();
            rebuilt.restore_draft(&snapshot).expect("restore succeeds");
            assert_eq!(rebuilt.form().items_per_group(), vec![items; groups]);
        }
    }
}

#[test]
fn corrupt_snapshots_are_rejected() {
    let engine_snapshot = {
        let mut engine = support::engine();
        engine.serialize_draft(saved_at(), Duration::hours(1))
    };

    let mut wrong_version = engine_snapshot.clone();
    wrong_version.version = SNAPSHOT_VERSION + 1;
    assert!(matches!(
        support::engine().restore_draft(&wrong_version),
        Err(DraftError::Corrupt(_))
    ));

    let empty_structure = DraftSnapshot {
        items_per_group: Vec::new(),
        ..engine_snapshot.clone()
    };
    assert!(matches!(
        support::engine().restore_draft(&empty_structure),
        Err(DraftError::Corrupt(_))
    ));

    let mut unknown_address = engine_snapshot.clone();
    unknown_address
        .values
        .insert("noSuchField".to_string(), "x".to_string());
    assert!(matches!(
        support::engine().restore_draft(&unknown_address),
        Err(DraftError::Corrupt(_))
    ));

    // A value addressed beyond the recorded structure is inconsistent.
    let mut out_of_bounds = engine_snapshot;
    out_of_bounds
        .values
        .insert("dvrLocation_g4".to_string(), "ghost".to_string());
    assert!(matches!(
        support::engine().restore_draft(&out_of_bounds),
        Err(DraftError::Corrupt(_))
    ));
}
