use crate::domain::{FieldKey, Scope, recovery_request};

#[test]
fn first_of_everything_has_no_suffix() {
    assert_eq!(FieldKey::form("officerName").address(), "officerName");
    assert_eq!(FieldKey::group("dvrPassword", 0).address(), "dvrPassword");
    assert_eq!(FieldKey::item("cameraDetails", 0, 0).address(), "cameraDetails");
}

#[test]
fn suffixes_follow_the_positional_scheme() {
    assert_eq!(FieldKey::group("dvrPassword", 1).address(), "dvrPassword_g1");
    assert_eq!(FieldKey::item("cameraDetails", 0, 1).address(), "cameraDetails_1");
    assert_eq!(FieldKey::item("cameraDetails", 1, 0).address(), "cameraDetails_g1");
    assert_eq!(
        FieldKey::item("cameraDetails", 2, 3).address(),
        "cameraDetails_g2_3"
    );
}

#[test]
fn parse_resolves_scope_against_the_catalog() {
    let spec = recovery_request();
    assert_eq!(
        FieldKey::parse("officerName", &spec).unwrap(),
        FieldKey::form("officerName")
    );
    assert_eq!(
        FieldKey::parse("dvrPassword_g2", &spec).unwrap(),
        FieldKey::group("dvrPassword", 2)
    );
    // Item-scoped bases normalize a missing item suffix to the first item.
    assert_eq!(
        FieldKey::parse("startTime", &spec).unwrap(),
        FieldKey::item("startTime", 0, 0)
    );
    assert_eq!(
        FieldKey::parse("startTime_g1", &spec).unwrap(),
        FieldKey::item("startTime", 1, 0)
    );
    assert_eq!(
        FieldKey::parse("startTime_2", &spec).unwrap(),
        FieldKey::item("startTime", 0, 2)
    );
}

#[test]
fn round_trip_is_total_over_valid_keys() {
    let spec = recovery_request();
    for group in 0..4 {
        for item in 0..4 {
            let key = FieldKey::item("cameraDetails", group, item);
            assert_eq!(FieldKey::parse(&key.address(), &spec).unwrap(), key);
        }
        let key = FieldKey::group("dvrLocation", group);
        assert_eq!(FieldKey::parse(&key.address(), &spec).unwrap(), key);
    }
    let key = FieldKey::form("incidentAddress");
    assert_eq!(FieldKey::parse(&key.address(), &spec).unwrap(), key);
}

#[test]
fn parse_rejects_unknown_and_misscoped_addresses() {
    let spec = recovery_request();
    assert!(FieldKey::parse("noSuchField", &spec).is_err());
    // Group-scoped base with an item suffix.
    assert!(FieldKey::parse("dvrPassword_2", &spec).is_err());
    // Top-level base with a group suffix.
    assert!(FieldKey::parse("officerName_g1", &spec).is_err());
    // Zero suffixes are never emitted and never accepted.
    assert!(FieldKey::parse("cameraDetails_0", &spec).is_err());
    assert!(FieldKey::parse("cameraDetails_g0", &spec).is_err());
}

#[test]
fn catalog_scopes_are_unambiguous() {
    let spec = recovery_request();
    assert_eq!(spec.scope_of("officerEmail"), Some(Scope::Form));
    assert_eq!(spec.scope_of("timeCorrect"), Some(Scope::Group));
    assert_eq!(spec.scope_of("endTime"), Some(Scope::Item));
    assert_eq!(spec.scope_of("bogus"), None);
}
