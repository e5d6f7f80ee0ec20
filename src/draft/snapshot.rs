use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bumped whenever the snapshot layout changes; older records are discarded
/// rather than migrated.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Default lifetime of a saved draft.
pub const DRAFT_TTL_HOURS: i64 = 72;

/// A persisted picture of the whole dynamic form: enough structure to rebuild
/// the tree before a single value is written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// One entry per recorder group: how many time-frames it held.
    pub items_per_group: Vec<usize>,
    /// Wire address to raw value, in document order.
    pub values: IndexMap<String, String>,
    /// Addresses of conditional fields that were visible when saved. Restore
    /// derives visibility from the controlling values; this list is a
    /// cross-check, not an input.
    pub open_sections: Vec<String>,
}

impl DraftSnapshot {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
