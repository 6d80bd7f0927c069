use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Lifecycle of the synchronizer as seen by readers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SyncState {
    #[default]
    Initializing,
    Syncing,
    Live,
    /// Initialization gave up; readers should treat the cache as read-only.
    Disabled { reason: String },
}

impl SyncState {
    pub fn is_live(&self) -> bool {
        matches!(self, SyncState::Live)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, SyncState::Disabled { .. })
    }
}
