//! Read-modify-write engine.
//!
//! Every operation is one cycle against the remote file:
//!
//! 1. fetch the file and its revision
//! 2. decode, apply the caller's mutation, prune, render
//! 3. write back conditionally on the revision from step 1
//! 4. fetch again and decode what the store actually holds
//!
//! Nothing is cached between cycles. Add and remove always start from a
//! fresh read, and the returned [`Snapshot`] always reflects the store, not
//! the locally rendered text.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec::{self, Dialect};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{Checklist, Committed, FileKey, RemoteFile, Snapshot};
use crate::remote::{RemoteStore, RepoAccess};

use super::lock::FileLocks;
use super::phase::{PhaseBoard, SyncPhase};

/// A caller-supplied checklist transformation.
pub type Mutation = Box<dyn FnOnce(Checklist) -> Result<Checklist> + Send>;

/// Decode file content, treating blank content as an empty checklist.
#[must_use]
pub fn decode(content: &str, dialect: Dialect) -> Checklist {
    if content.trim().is_empty() {
        Checklist::new()
    } else {
        codec::parse_with(content, dialect)
    }
}

/// Apply `mutate` to the decoded remote content and render the result.
///
/// Categories left empty by the mutation are pruned before rendering. The
/// result must decode back to itself: names and items that would be
/// rewritten or merged by the next read are rejected with
/// `InvalidArgument` and nothing is rendered.
pub fn apply_mutation(remote: &RemoteFile, dialect: Dialect, mutate: Mutation) -> Result<String> {
    let checklist = decode(&remote.content, dialect);
    let mutated = mutate(checklist)?.pruned();
    ensure_renderable(&mutated)?;
    Ok(codec::render_with(&mutated, dialect))
}

/// Check that every name and item survives a render/decode round trip.
fn ensure_renderable(checklist: &Checklist) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for category in checklist.categories() {
        single_line_exact("category", &category.name)?;
        if !seen.insert(category.name.as_str()) {
            return Err(Error::InvalidArgument(format!(
                "category '{}' appears more than once",
                category.name
            )));
        }
        for (i, item) in category.items.iter().enumerate() {
            single_line_exact("item", &item.content)?;
            if category.items[..i].iter().any(|other| other.content == item.content) {
                return Err(Error::InvalidArgument(format!(
                    "item '{}' appears more than once in '{}'",
                    item.content, category.name
                )));
            }
        }
    }
    Ok(())
}

/// Like [`single_line`], but the value must already be in normalized form.
fn single_line_exact(field: &str, value: &str) -> Result<()> {
    let normalized = single_line(field, value)?;
    if normalized != value {
        return Err(Error::InvalidArgument(format!(
            "{field} {value:?} has leading or trailing whitespace"
        )));
    }
    Ok(())
}

/// Mutation adding `content` under `category`.
pub fn add_item_mutation(category: &str, content: &str) -> Result<Mutation> {
    let category = single_line("category", category)?;
    let content = single_line("content", content)?;
    Ok(Box::new(move |mut list: Checklist| {
        if !list.add_item(&category, &content) {
            debug!(%category, %content, "item already present");
        }
        Ok(list)
    }))
}

/// Mutation removing the item at zero-based `index` in `category`.
pub fn remove_item_mutation(category: &str, index: usize) -> Result<Mutation> {
    let category = single_line("category", category)?;
    Ok(Box::new(move |mut list: Checklist| {
        if list.category(&category).is_none() {
            return Err(Error::CategoryNotFound { category });
        }
        if list.remove_item(&category, index).is_none() {
            return Err(Error::ItemNotFound { category, index });
        }
        Ok(list)
    }))
}

fn single_line(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{field} must not be empty")));
    }
    if value.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(format!("{field} must be a single line")));
    }
    Ok(value.to_string())
}

async fn with_timeout<T>(
    limit: Duration,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    if let Ok(result) = tokio::time::timeout(limit, fut).await {
        result
    } else {
        warn!(operation, seconds = limit.as_secs(), "remote call timed out");
        Err(Error::Timeout {
            operation: operation.to_string(),
            seconds: limit.as_secs(),
        })
    }
}

/// Resets the file's phase to `Idle` when a cycle ends or is dropped.
struct PhaseReset<'a>(&'a watch::Sender<SyncPhase>);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        self.0.send_replace(SyncPhase::Idle);
    }
}

/// Sync engine over a remote store.
///
/// Cheap to clone; clones share the store, the per-file locks and the
/// per-file phase channels.
pub struct SyncEngine<S> {
    store: Arc<S>,
    locks: Arc<FileLocks>,
    phases: Arc<PhaseBoard>,
}

impl<S> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locks: Arc::clone(&self.locks),
            phases: Arc::clone(&self.phases),
        }
    }
}

impl<S: RemoteStore + 'static> SyncEngine<S> {
    /// Create an engine owning `store`.
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    /// Create an engine over a shared store.
    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            locks: Arc::new(FileLocks::new()),
            phases: Arc::new(PhaseBoard::default()),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current phase of the cycle on `file` (`Idle` when none is running).
    #[must_use]
    pub fn phase(&self, file: &FileKey) -> SyncPhase {
        self.phases.current(file)
    }

    /// Observe phase transitions on `file` (e.g. to drive a progress indicator).
    ///
    /// Cycles on other files do not show up here.
    #[must_use]
    pub fn subscribe(&self, file: &FileKey) -> watch::Receiver<SyncPhase> {
        self.phases.channel(file).subscribe()
    }

    pub(crate) fn locks(&self) -> &FileLocks {
        &self.locks
    }

    /// Read the remote file.
    ///
    /// Fails with `NotConfigured` before touching the store if owner, repo
    /// or token is missing. A missing file is not an error.
    pub async fn fetch_remote(&self, settings: &Settings) -> Result<RemoteFile> {
        settings.ensure_configured()?;
        with_timeout(
            settings.request_timeout(),
            "fetching remote file",
            self.store.fetch(settings),
        )
        .await
    }

    /// Conditionally write `content` on top of `base_sha`.
    ///
    /// A stale `base_sha` yields `Conflict`; nothing is retried.
    pub async fn write_remote(
        &self,
        settings: &Settings,
        content: &str,
        base_sha: Option<&str>,
    ) -> Result<Committed> {
        settings.ensure_configured()?;
        let result = with_timeout(
            settings.request_timeout(),
            "writing remote file",
            self.store.write(settings, content, base_sha),
        )
        .await;

        if let Err(Error::Conflict { file }) = &result {
            warn!(%file, base_sha = ?base_sha, "write rejected: stale revision");
        }
        result
    }

    /// Connectivity check against the repository.
    pub async fn check_access(&self, settings: &Settings) -> Result<RepoAccess> {
        settings.ensure_configured()?;
        with_timeout(
            settings.request_timeout(),
            "checking repository access",
            self.store.check_access(settings),
        )
        .await
    }

    /// Run one full cycle: fetch, mutate, write, reconcile.
    ///
    /// With `mutate = None` this is a pure refresh. Waits for any other
    /// cycle on the same file to finish first.
    pub async fn sync_cycle(
        &self,
        settings: &Settings,
        mutate: Option<Mutation>,
    ) -> Result<Snapshot> {
        settings.ensure_configured()?;
        let key = settings.file_key();
        let _guard = self.locks.acquire(&key).await;
        self.run_locked(settings, &key, mutate).await
    }

    /// Pure refresh.
    pub async fn refresh(&self, settings: &Settings) -> Result<Snapshot> {
        self.sync_cycle(settings, None).await
    }

    /// Pure refresh that gives up immediately if the file is busy.
    ///
    /// Returns `None` when another cycle holds the file.
    pub async fn try_refresh(&self, settings: &Settings) -> Option<Result<Snapshot>> {
        if let Err(e) = settings.ensure_configured() {
            return Some(Err(e));
        }
        let key = settings.file_key();
        let _guard = self.locks.try_acquire(&key)?;
        Some(self.run_locked(settings, &key, None).await)
    }

    /// Add an item (duplicate content is left as is).
    pub async fn add_item(
        &self,
        settings: &Settings,
        category: &str,
        content: &str,
    ) -> Result<Snapshot> {
        let mutation = add_item_mutation(category, content)?;
        self.sync_cycle(settings, Some(mutation)).await
    }

    /// Remove the item at zero-based `index` from `category`.
    pub async fn remove_item(
        &self,
        settings: &Settings,
        category: &str,
        index: usize,
    ) -> Result<Snapshot> {
        let mutation = remove_item_mutation(category, index)?;
        self.sync_cycle(settings, Some(mutation)).await
    }

    /// Refresh once more after `delay`.
    ///
    /// Used after a write so that server-side propagation shows up in the
    /// caller's view.
    pub fn schedule_resync(
        &self,
        settings: Settings,
        delay: Duration,
    ) -> JoinHandle<Result<Snapshot>> {
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(file = %settings.file_key(), "deferred resync");
            engine.refresh(&settings).await
        })
    }

    async fn run_locked(
        &self,
        settings: &Settings,
        key: &FileKey,
        mutate: Option<Mutation>,
    ) -> Result<Snapshot> {
        let phase = self.phases.channel(key);
        let _reset = PhaseReset(&phase);
        let result = self.run_phases(settings, key, &phase, mutate).await;
        if let Err(e) = &result {
            warn!(file = %key, error = %e, "sync cycle failed");
            set_phase(&phase, key, SyncPhase::Failed);
        }
        result
    }

    async fn run_phases(
        &self,
        settings: &Settings,
        key: &FileKey,
        phase: &watch::Sender<SyncPhase>,
        mutate: Option<Mutation>,
    ) -> Result<Snapshot> {
        set_phase(phase, key, SyncPhase::Fetching);
        let remote = self.fetch_remote(settings).await?;

        let Some(mutate) = mutate else {
            return Ok(snapshot(key, remote, settings.dialect, false));
        };

        set_phase(phase, key, SyncPhase::Mutating);
        let content = apply_mutation(&remote, settings.dialect, mutate)?;
        if content == remote.content {
            debug!(file = %key, "mutation left the file unchanged; skipping write");
            return Ok(snapshot(key, remote, settings.dialect, false));
        }

        set_phase(phase, key, SyncPhase::Writing);
        let committed = self
            .write_remote(settings, &content, remote.sha.as_deref())
            .await?;
        info!(file = %key, sha = %committed.sha, store = self.store.name(), "checklist committed");

        set_phase(phase, key, SyncPhase::Reconciling);
        let fresh = self.fetch_remote(settings).await?;
        Ok(snapshot(key, fresh, settings.dialect, true))
    }
}

fn set_phase(channel: &watch::Sender<SyncPhase>, key: &FileKey, phase: SyncPhase) {
    debug!(file = %key, %phase, "sync phase");
    channel.send_replace(phase);
}

fn snapshot(key: &FileKey, remote: RemoteFile, dialect: Dialect, committed: bool) -> Snapshot {
    Snapshot {
        file: key.clone(),
        checklist: decode(&remote.content, dialect),
        sha: remote.sha,
        last_sync_time: chrono::Utc::now(),
        committed,
    }
}
