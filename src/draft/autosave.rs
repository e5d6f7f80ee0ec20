use std::time::{Duration, Instant};

/// Background autosave bookkeeping: a dirty flag plus a deadline that resets
/// on every edit. Last write wins; a new edit replaces the pending deadline
/// rather than queueing a second save.
#[derive(Debug, Clone)]
pub struct Autosaver {
    interval: Duration,
    dirty: bool,
    deadline: Option<Instant>,
}

impl Autosaver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            dirty: false,
            deadline: None,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn note_edit(&mut self, now: Instant) {
        self.dirty = true;
        self.deadline = Some(now + self.interval);
    }

    /// Whether a save should run now. False while clean; the nothing-changed
    /// tick is an explicit no-op.
    pub fn due(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => self.dirty && now >= deadline,
            None => false,
        }
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.deadline = None;
    }
}
