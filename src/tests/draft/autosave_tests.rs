use std::time::{Duration, Instant};

use crate::draft::Autosaver;

#[test]
fn clean_autosaver_is_never_due() {
    let autosaver = Autosaver::new(Duration::from_secs(5));
    assert!(!autosaver.is_dirty());
    assert!(!autosaver.due(Instant::now() + Duration::from_secs(60)));
}

#[test]
fn edit_arms_the_deadline_and_save_disarms_it() {
    let start = Instant::now();
    let mut autosaver = Autosaver::new(Duration::from_secs(5));

    autosaver.note_edit(start);
    assert!(autosaver.is_dirty());
    assert!(!autosaver.due(start + Duration::from_secs(4)));
    assert!(autosaver.due(start + Duration::from_secs(5)));

    autosaver.mark_saved();
    assert!(!autosaver.is_dirty());
    assert!(!autosaver.due(start + Duration::from_secs(60)));
}

#[test]
fn a_new_edit_resets_the_pending_deadline() {
    let start = Instant::now();
    let mut autosaver = Autosaver::new(Duration::from_secs(5));

    autosaver.note_edit(start);
    autosaver.note_edit(start + Duration::from_secs(4));
    // The first deadline has passed, but the edit pushed it out.
    assert!(!autosaver.due(start + Duration::from_secs(6)));
    assert!(autosaver.due(start + Duration::from_secs(9)));
}
