//! Remote file stores.
//!
//! A store reads and conditionally writes the checklist file:
//! - **GitHub** - the Contents API, used by the command line
//! - **Memory** - an in-process store with the same revision semantics
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SyncEngine     │  ← fetch / write / reconcile
//! └────────┬─────────┘
//!          │ RemoteStore
//!     ┌────┴─────┐
//!     ▼          ▼
//! ┌────────┐ ┌────────┐
//! │ GitHub │ │ Memory │
//! └────────┘ └────────┘
//!     │
//!     ▼
//!   HTTPS
//! api.github.com
//! ```
//!
//! Stores report a missing file as [`RemoteFile::missing`], never as an
//! error, and report a stale base revision as [`Error::Conflict`].
//!
//! [`Error::Conflict`]: crate::error::Error::Conflict

mod github;
mod hash;
mod memory;

pub use github::{GitHubStore, API_VERSION, USER_AGENT};
pub use hash::content_sha;
pub use memory::MemoryStore;

use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;
use crate::model::{Committed, RemoteFile};

/// Repository facts returned by the connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoAccess {
    pub full_name: String,
    pub default_branch: String,
    pub private: bool,
    /// Whether the token may write contents.
    pub can_push: bool,
}

/// Trait for remote file stores.
///
/// Implementations receive the full [`Settings`] on every call and read
/// the owner, repo, path and token from it. Required fields are validated
/// by the engine before a store is called.
pub trait RemoteStore: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Read the file. A missing file yields `RemoteFile::missing()`.
    fn fetch(&self, settings: &Settings)
    -> impl std::future::Future<Output = Result<RemoteFile>> + Send;

    /// Write `content` if the file is still at `base_sha`.
    ///
    /// `None` means "create": it fails with a conflict if the file exists.
    fn write(
        &self,
        settings: &Settings,
        content: &str,
        base_sha: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Committed>> + Send;

    /// Verify that the repository is reachable with the configured token.
    fn check_access(
        &self,
        settings: &Settings,
    ) -> impl std::future::Future<Output = Result<RepoAccess>> + Send;
}
