use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::snapshot::{DraftSnapshot, SNAPSHOT_VERSION};

/// One snapshot record per form identifier. Expired or malformed records
/// load as `None`; a draft that cannot be read is a draft that does not
/// exist.
pub trait DraftStore {
    fn load(&self, form_id: &str, now: DateTime<Utc>) -> Result<Option<DraftSnapshot>>;
    fn save(&self, form_id: &str, snapshot: &DraftSnapshot) -> Result<()>;
    fn clear(&self, form_id: &str) -> Result<()>;
}

/// File-backed store: one pretty-printed JSON record per form id.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn record_path(&self, form_id: &str) -> PathBuf {
        self.dir.join(format!("{form_id}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, form_id: &str, now: DateTime<Utc>) -> Result<Option<DraftSnapshot>> {
        let path = self.record_path(form_id);
        if !path.exists() {
            return Ok(None);
        }
        let payload = fs::read_to_string(&path)
            .with_context(|| format!("failed to read draft {}", path.display()))?;
        let snapshot: DraftSnapshot = match serde_json::from_str(&payload) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("discarding unreadable draft {}: {err}", path.display());
                return Ok(None);
            }
        };
        Ok(vet(snapshot, form_id, now))
    }

    fn save(&self, form_id: &str, snapshot: &DraftSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create draft dir {}", self.dir.display()))?;
        let path = self.record_path(form_id);
        let payload = serde_json::to_string_pretty(snapshot).context("failed to encode draft")?;
        fs::write(&path, payload)
            .with_context(|| format!("failed to write draft {}", path.display()))?;
        Ok(())
    }

    fn clear(&self, form_id: &str) -> Result<()> {
        let path = self.record_path(form_id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove draft {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests and headless embedding.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    records: RefCell<HashMap<String, DraftSnapshot>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, form_id: &str, now: DateTime<Utc>) -> Result<Option<DraftSnapshot>> {
        let snapshot = self.records.borrow().get(form_id).cloned();
        Ok(snapshot.and_then(|snapshot| vet(snapshot, form_id, now)))
    }

    fn save(&self, form_id: &str, snapshot: &DraftSnapshot) -> Result<()> {
        self.records
            .borrow_mut()
            .insert(form_id.to_string(), snapshot.clone());
        Ok(())
    }

    fn clear(&self, form_id: &str) -> Result<()> {
        self.records.borrow_mut().remove(form_id);
        Ok(())
    }
}

fn vet(snapshot: DraftSnapshot, form_id: &str, now: DateTime<Utc>) -> Option<DraftSnapshot> {
    if snapshot.version != SNAPSHOT_VERSION {
        log::warn!(
            "discarding draft for {form_id}: version {} is not {SNAPSHOT_VERSION}",
            snapshot.version
        );
        return None;
    }
    if snapshot.is_expired(now) {
        log::debug!("draft for {form_id} expired at {}", snapshot.expires_at);
        return None;
    }
    Some(snapshot)
}
