//! In-memory remote store.
//!
//! Holds files keyed by [`FileKey`] and applies the same conditional-write
//! rules as GitHub: a write must name the current revision, or `None` when
//! the file does not exist. Used by tests and by embedders that want the
//! sync engine without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{Committed, FileKey, RemoteFile};

use super::hash::content_sha;
use super::{RemoteStore, RepoAccess};

#[derive(Debug, Clone)]
struct StoredFile {
    content: String,
    sha: String,
}

/// In-process store with GitHub-like revision checks.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<FileKey, StoredFile>>,
    /// Content written by a simulated concurrent editor right after the next fetch.
    pending_edit: Mutex<Option<String>>,
    latency: Duration,
    fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    #[must_use]
    pub fn with_file(self, key: &FileKey, content: &str) -> Self {
        self.put_external(key, content);
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn files(&self) -> MutexGuard<'_, HashMap<FileKey, StoredFile>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite a file unconditionally, as another client would.
    ///
    /// Returns the new revision.
    pub fn put_external(&self, key: &FileKey, content: &str) -> String {
        let sha = content_sha(content);
        self.files().insert(
            key.clone(),
            StoredFile {
                content: content.to_string(),
                sha: sha.clone(),
            },
        );
        sha
    }

    /// Arrange for another client to overwrite the file right after the
    /// next fetch, making the caller's revision stale.
    pub fn edit_after_next_fetch(&self, content: &str) {
        *self
            .pending_edit
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(content.to_string());
    }

    /// Remove a file.
    pub fn delete(&self, key: &FileKey) {
        self.files().remove(key);
    }

    /// Current content of a file.
    #[must_use]
    pub fn content(&self, key: &FileKey) -> Option<String> {
        self.files().get(key).map(|f| f.content.clone())
    }

    /// Current revision of a file.
    #[must_use]
    pub fn sha(&self, key: &FileKey) -> Option<String> {
        self.files().get(key).map(|f| f.sha.clone())
    }

    /// Number of fetch calls served.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of successful writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl RemoteStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, settings: &Settings) -> Result<RemoteFile> {
        self.delay().await;
        let key = settings.file_key();
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let file = self
            .files()
            .get(&key)
            .map_or_else(RemoteFile::missing, |f| RemoteFile {
                content: f.content.clone(),
                sha: Some(f.sha.clone()),
            });

        let edit = self
            .pending_edit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(content) = edit {
            self.put_external(&key, &content);
        }

        Ok(file)
    }

    async fn write(
        &self,
        settings: &Settings,
        content: &str,
        base_sha: Option<&str>,
    ) -> Result<Committed> {
        self.delay().await;
        let key = settings.file_key();
        let mut files = self.files();

        let current = files.get(&key).map(|f| f.sha.as_str());
        if current != base_sha {
            return Err(Error::Conflict {
                file: key.to_string(),
            });
        }

        let sha = content_sha(content);
        files.insert(
            key,
            StoredFile {
                content: content.to_string(),
                sha: sha.clone(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Committed { sha })
    }

    async fn check_access(&self, settings: &Settings) -> Result<RepoAccess> {
        self.delay().await;
        Ok(RepoAccess {
            full_name: format!("{}/{}", settings.owner, settings.repo),
            default_branch: "main".to_string(),
            private: true,
            can_push: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            token: "t".into(),
            owner: "acme".into(),
            repo: "web".into(),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let store = MemoryStore::new();
        let file = store.fetch(&settings()).await.unwrap();
        assert_eq!(file, RemoteFile::missing());
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_create_then_update() {
        let store = MemoryStore::new();
        let s = settings();

        let created = store.write(&s, "v1", None).await.unwrap();
        let updated = store.write(&s, "v2", Some(&created.sha)).await.unwrap();

        assert_ne!(created.sha, updated.sha);
        assert_eq!(store.content(&s.file_key()).as_deref(), Some("v2"));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_stale_sha_conflicts() {
        let s = settings();
        let store = MemoryStore::new().with_file(&s.file_key(), "v1");
        let stale = store.fetch(&s).await.unwrap().sha;
        store.put_external(&s.file_key(), "v2");

        let err = store.write(&s, "v3", stale.as_deref()).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(store.content(&s.file_key()).as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_create_over_existing_conflicts() {
        let s = settings();
        let store = MemoryStore::new().with_file(&s.file_key(), "v1");
        let err = store.write(&s, "v2", None).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_edit_after_next_fetch() {
        let s = settings();
        let store = MemoryStore::new().with_file(&s.file_key(), "v1");
        store.edit_after_next_fetch("other");

        let read = store.fetch(&s).await.unwrap();
        assert_eq!(read.content, "v1");
        assert_eq!(store.content(&s.file_key()).as_deref(), Some("other"));
        assert_ne!(read.sha, store.sha(&s.file_key()));
    }
}
