//! Per-file mutual exclusion.
//!
//! One async mutex per [`FileKey`], created on first use. Holding the
//! guard for a whole cycle keeps two cycles from interleaving their
//! read and write against the same file.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::model::FileKey;

#[derive(Default)]
pub struct FileLocks {
    inflight: Mutex<HashMap<FileKey, Arc<AsyncMutex<()>>>>,
}

impl FileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &FileKey) -> Arc<AsyncMutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }

    /// Wait until the file is free and take it.
    pub async fn acquire(&self, key: &FileKey) -> OwnedMutexGuard<()> {
        self.lock_for(key).lock_owned().await
    }

    /// Take the file only if nobody holds it.
    pub fn try_acquire(&self, key: &FileKey) -> Option<OwnedMutexGuard<()>> {
        self.lock_for(key).try_lock_owned().ok()
    }
}
