//! Add and remove command implementations.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tracing::warn;

use crate::config::{Settings, SettingsPatch};
use crate::error::{Error, Result};
use crate::model::Snapshot;
use crate::remote::RemoteStore;
use crate::sync::SyncEngine;

use super::{connect, print_snapshot, runtime};

#[derive(Serialize)]
struct ChangeOutput<'a> {
    action: &'a str,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<u32>,
    snapshot: &'a Snapshot,
}

/// Add `content` under `category`.
pub fn add(
    category: &str,
    content: &str,
    config: Option<&Path>,
    overrides: &SettingsPatch,
    json: bool,
) -> Result<()> {
    let (settings, engine) = connect(config, overrides)?;

    let snapshot = runtime()?.block_on(async {
        let snapshot = engine.add_item(&settings, category, content).await?;
        Ok::<_, Error>(settle(&engine, &settings, snapshot).await)
    })?;

    if json {
        let output = ChangeOutput {
            action: "add",
            category,
            content: Some(content),
            index: None,
            snapshot: &snapshot,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {} → {}", "Added".green(), content.trim(), category.trim().cyan());
    println!();
    print_snapshot(&snapshot, false)
}

/// Remove item number `index` (1-based) from `category`.
pub fn remove(
    category: &str,
    index: u32,
    config: Option<&Path>,
    overrides: &SettingsPatch,
    json: bool,
) -> Result<()> {
    let (settings, engine) = connect(config, overrides)?;
    let position = index.saturating_sub(1) as usize;

    let snapshot = runtime()?.block_on(async {
        let snapshot = engine.remove_item(&settings, category, position).await?;
        Ok::<_, Error>(settle(&engine, &settings, snapshot).await)
    })?;

    if json {
        let output = ChangeOutput {
            action: "remove",
            category,
            content: None,
            index: Some(index),
            snapshot: &snapshot,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} item {index} from {}", "Removed".green(), category.trim().cyan());
    println!();
    print_snapshot(&snapshot, false)
}

/// Wait for the follow-up refresh, falling back to the cycle's snapshot.
///
/// Cycles that did not write return at once.
async fn settle<S: RemoteStore + 'static>(
    engine: &SyncEngine<S>,
    settings: &Settings,
    snapshot: Snapshot,
) -> Snapshot {
    if !snapshot.committed {
        return snapshot;
    }
    let Some(delay) = settings.resync_delay() else {
        return snapshot;
    };

    match engine.schedule_resync(settings.clone(), delay).await {
        Ok(Ok(fresh)) => Snapshot {
            committed: true,
            ..fresh
        },
        Ok(Err(e)) => {
            warn!(error = %e, "follow-up refresh failed");
            snapshot
        }
        Err(e) => {
            warn!(error = %e, "follow-up refresh task failed");
            snapshot
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::remote::MemoryStore;

    fn settings(resync_delay_ms: u64) -> Settings {
        Settings {
            token: "ghp_test".into(),
            owner: "acme".into(),
            repo: "web".into(),
            resync_delay_ms,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_settle_skips_resync_without_write() {
        let s = settings(60_000);
        let engine = SyncEngine::new(MemoryStore::new().with_file(&s.file_key(), "## A\n- x\n"));
        let snapshot = engine.add_item(&s, "A", "x").await.unwrap();
        let fetches = engine.store().fetch_count();

        let settled = tokio::time::timeout(
            Duration::from_millis(500),
            settle(&engine, &s, snapshot),
        )
        .await
        .unwrap();
        assert!(!settled.committed);
        assert_eq!(engine.store().fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_settle_refreshes_after_write() {
        let s = settings(20);
        let engine = SyncEngine::new(MemoryStore::new());
        let snapshot = engine.add_item(&s, "A", "x").await.unwrap();
        engine.store().put_external(&s.file_key(), "## A\n- x\n- y\n");

        let settled = settle(&engine, &s, snapshot).await;
        assert!(settled.committed);
        assert_eq!(settled.checklist.item_count(), 2);
    }
}
