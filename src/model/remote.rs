//! Remote file and sync snapshot types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checklist::Checklist;

/// Identity of the synced file: `(owner, repo, path)`.
///
/// Also the key for per-file mutual exclusion in the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileKey {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl FileKey {
    pub fn new(owner: &str, repo: &str, path: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            path: path.trim_start_matches('/').to_string(),
        }
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.path)
    }
}

/// File contents as read from the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    /// Decoded UTF-8 text.
    pub content: String,
    /// Base revision for the next conditional write; `None` if the file does not exist.
    pub sha: Option<String>,
}

impl RemoteFile {
    /// The "file does not exist yet" value.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            content: String::new(),
            sha: None,
        }
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.sha.is_some()
    }
}

/// Result of a successful conditional write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committed {
    /// Revision of the file after the write.
    pub sha: String,
}

/// The authoritative view produced by a successful sync cycle.
///
/// Callers keep the most recent snapshot; a failed cycle produces no
/// snapshot and leaves the previous one in place.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub file: FileKey,
    pub checklist: Checklist,
    pub sha: Option<String>,
    pub last_sync_time: DateTime<Utc>,
    /// True when the cycle that produced this snapshot wrote the file.
    pub committed: bool,
}
