//! Outcome of a synchronization run

use crate::error::Error;
use crate::identity::MessageIdentity;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A message that could not be synced in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub uid: Option<u32>,
    pub identity: Option<String>,
    pub error: String,
}

impl Failure {
    pub(crate) fn new(uid: Option<u32>, identity: Option<&str>, error: &Error) -> Self {
        Self {
            uid,
            identity: identity.map(str::to_string),
            error: error.to_string(),
        }
    }

    pub(crate) fn for_message(uid: u32, identity: &MessageIdentity, error: &Error) -> Self {
        Self::new(Some(uid), Some(identity.as_str()), error)
    }
}

/// Per-folder counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderReport {
    pub folder: String,
    pub local_name: Option<String>,
    /// Why the folder was skipped, if it was.
    pub skipped: Option<String>,
    /// Messages listed by the server.
    pub messages: usize,
    pub already_synced: usize,
    pub linked: usize,
    pub fetched: usize,
    pub quarantined: usize,
    pub failures: Vec<Failure>,
}

impl FolderReport {
    #[must_use]
    pub fn new(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            ..Self::default()
        }
    }

    /// Whether anything was written, linked or moved.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.linked + self.fetched + self.quarantined > 0
    }
}

/// Everything a run did, one entry per remote folder in processing
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub folders: Vec<FolderReport>,
}

impl SyncReport {
    #[must_use]
    pub fn folder(&self, name: &str) -> Option<&FolderReport> {
        self.folders.iter().find(|f| f.folder == name)
    }

    #[must_use]
    pub fn fetched(&self) -> usize {
        self.folders.iter().map(|f| f.fetched).sum()
    }

    #[must_use]
    pub fn linked(&self) -> usize {
        self.folders.iter().map(|f| f.linked).sum()
    }

    #[must_use]
    pub fn quarantined(&self) -> usize {
        self.folders.iter().map(|f| f.quarantined).sum()
    }

    #[must_use]
    pub fn failures(&self) -> usize {
        self.folders.iter().map(|f| f.failures.len()).sum()
    }

    /// Folders that were skipped.
    pub fn skipped(&self) -> impl Iterator<Item = &FolderReport> {
        self.folders.iter().filter(|f| f.skipped.is_some())
    }
}
