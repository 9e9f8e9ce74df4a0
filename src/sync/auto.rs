//! Periodic refresh while the checklist is on screen.
//!
//! A background task refreshes every `period` as long as the view is
//! visible. Becoming visible triggers an immediate refresh. Ticks that land
//! while another cycle holds the file are skipped rather than queued.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::model::Snapshot;
use crate::remote::RemoteStore;

use super::engine::SyncEngine;

/// Handle to a running auto-refresh task.
pub struct AutoRefresh {
    visible: watch::Sender<bool>,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AutoRefresh {
    /// Start refreshing `settings`' file every `period`.
    ///
    /// Each finished refresh is handed to `on_result`. The view starts out
    /// visible.
    pub fn spawn<S, F>(
        engine: SyncEngine<S>,
        settings: Settings,
        period: Duration,
        mut on_result: F,
    ) -> Self
    where
        S: RemoteStore + 'static,
        F: FnMut(Result<Snapshot>) + Send + 'static,
    {
        let (visible, mut visible_rx) = watch::channel(true);
        let (cancel, mut cancel_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                let due = tokio::select! {
                    _ = cancel_rx.changed() => break,
                    changed = visible_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        *visible_rx.borrow_and_update()
                    }
                    _ = ticker.tick() => *visible_rx.borrow(),
                };
                if !due {
                    continue;
                }

                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    outcome = engine.try_refresh(&settings) => match outcome {
                        Some(result) => on_result(result),
                        None => {
                            debug!(file = %settings.file_key(), "auto refresh skipped: file busy");
                        }
                    },
                }
            }
            debug!(file = %settings.file_key(), "auto refresh stopped");
        });

        Self {
            visible,
            cancel,
            handle,
        }
    }

    /// Tell the task whether the checklist is currently shown.
    pub fn set_visible(&self, visible: bool) {
        self.visible.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Stop the task and wait for it to exit.
    ///
    /// An in-flight refresh is abandoned.
    pub async fn stop(self) {
        self.cancel.send_replace(true);
        if let Err(e) = self.handle.await {
            debug!(error = %e, "auto refresh task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use tokio::sync::mpsc;

    const PERIOD: Duration = Duration::from_millis(20);

    fn settings() -> Settings {
        Settings {
            token: "ghp_test".into(),
            owner: "acme".into(),
            repo: "web".into(),
            ..Settings::default()
        }
    }

    fn start(
        engine: &SyncEngine<MemoryStore>,
    ) -> (AutoRefresh, mpsc::UnboundedReceiver<Result<Snapshot>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let auto = AutoRefresh::spawn(engine.clone(), settings(), PERIOD, move |result| {
            let _ = tx.send(result);
        });
        (auto, rx)
    }

    #[tokio::test]
    async fn test_delivers_refreshes() {
        let s = settings();
        let engine = SyncEngine::new(MemoryStore::new().with_file(&s.file_key(), "## A\n- x\n"));
        let (auto, mut rx) = start(&engine);

        let snap = rx.recv().await.unwrap().unwrap();
        assert_eq!(snap.checklist.item_count(), 1);

        engine.store().put_external(&s.file_key(), "## A\n- x\n- y\n");
        let snap = loop {
            let snap = rx.recv().await.unwrap().unwrap();
            if snap.checklist.item_count() == 2 {
                break snap;
            }
        };
        assert_eq!(snap.checklist.category("A").unwrap().items.len(), 2);
        auto.stop().await;
    }

    #[tokio::test]
    async fn test_hidden_view_does_not_refresh() {
        let engine = SyncEngine::new(MemoryStore::new());
        let (auto, _rx) = start(&engine);
        auto.set_visible(false);
        assert!(!auto.is_visible());

        tokio::time::sleep(PERIOD * 2).await;
        let fetches = engine.store().fetch_count();
        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(engine.store().fetch_count(), fetches);
        auto.stop().await;
    }

    #[tokio::test]
    async fn test_becoming_visible_refreshes_immediately() {
        let engine = SyncEngine::new(MemoryStore::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let auto = AutoRefresh::spawn(
            engine.clone(),
            settings(),
            Duration::from_secs(3600),
            move |result| {
                let _ = tx.send(result);
            },
        );
        auto.set_visible(false);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(engine.store().fetch_count(), 0);

        auto.set_visible(true);
        let result = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        auto.stop().await;
    }

    #[tokio::test]
    async fn test_busy_file_skips_tick() {
        let s = settings();
        let engine = SyncEngine::new(MemoryStore::new());
        let guard = engine.locks().acquire(&s.file_key()).await;
        let (auto, mut rx) = start(&engine);

        tokio::time::sleep(PERIOD * 4).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.store().fetch_count(), 0);

        drop(guard);
        assert!(rx.recv().await.unwrap().is_ok());
        auto.stop().await;
    }

    #[tokio::test]
    async fn test_stop_halts_refreshes() {
        let engine = SyncEngine::new(MemoryStore::new());
        let (auto, mut rx) = start(&engine);
        rx.recv().await.unwrap().unwrap();

        auto.stop().await;
        let fetches = engine.store().fetch_count();
        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(engine.store().fetch_count(), fetches);
    }
}
