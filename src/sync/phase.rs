//! Sync cycle phases.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::model::FileKey;

/// Where a sync cycle currently is.
///
/// ```text
/// Idle → Fetching → Mutating → Writing → Reconciling → Idle
///            └──────────┴──────────┴──────────┴──→ Failed → Idle
/// ```
///
/// A pure refresh goes `Idle → Fetching → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Mutating,
    Writing,
    Reconciling,
    Failed,
}

impl SyncPhase {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Mutating => "mutating",
            Self::Writing => "writing",
            Self::Reconciling => "reconciling",
            Self::Failed => "failed",
        }
    }

    /// True while a cycle is talking to the store or rendering.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle | Self::Failed)
    }
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One phase channel per file.
///
/// A phase only changes while its file lock is held, so each channel has a
/// single writer at a time.
#[derive(Default)]
pub(crate) struct PhaseBoard {
    channels: Mutex<HashMap<FileKey, Arc<watch::Sender<SyncPhase>>>>,
}

impl PhaseBoard {
    pub(crate) fn channel(&self, key: &FileKey) -> Arc<watch::Sender<SyncPhase>> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            channels
                .entry(key.clone())
                .or_insert_with(|| Arc::new(watch::channel(SyncPhase::Idle).0)),
        )
    }

    pub(crate) fn current(&self, key: &FileKey) -> SyncPhase {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(SyncPhase::Idle, |tx| *tx.borrow())
    }
}
