mod autosave;
mod codec;
mod snapshot;
mod store;

pub use autosave::Autosaver;
pub use codec::{RestoreReport, restore, serialize};
pub use snapshot::{DRAFT_TTL_HOURS, DraftSnapshot, SNAPSHOT_VERSION};
pub use store::{DraftStore, FileDraftStore, MemoryDraftStore};
