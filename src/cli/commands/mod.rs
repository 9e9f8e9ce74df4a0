//! Command implementations.

pub mod check;
pub mod completions;
pub mod config;
pub mod fmt;
pub mod items;
pub mod list;
pub mod version;
pub mod watch;

use std::path::Path;

use colored::Colorize;

use crate::config::{resolve_settings, Settings, SettingsPatch};
use crate::error::{Error, Result};
use crate::model::Snapshot;
use crate::remote::GitHubStore;
use crate::sync::SyncEngine;

/// Create the runtime that drives a single command.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))
}

/// Resolve settings and build an engine over GitHub.
///
/// Fails with `NotConfigured` before any client is built.
pub(crate) fn connect(
    config: Option<&Path>,
    overrides: &SettingsPatch,
) -> Result<(Settings, SyncEngine<GitHubStore>)> {
    let settings = resolve_settings(config, overrides)?;
    settings.ensure_configured()?;
    let engine = SyncEngine::new(GitHubStore::new()?);
    Ok((settings, engine))
}

/// Print a snapshot as a numbered list, or as one JSON document.
pub(crate) fn print_snapshot(snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    let revision = snapshot
        .sha
        .as_deref()
        .map_or_else(|| "not created yet".to_string(), |sha| short_sha(sha).to_string());
    println!(
        "{} {}",
        snapshot.file.to_string().bold(),
        format!(
            "({revision}, synced {})",
            snapshot.last_sync_time.format("%H:%M:%S")
        )
        .dimmed()
    );

    let categories: Vec<_> = snapshot
        .checklist
        .categories()
        .iter()
        .filter(|c| !c.items.is_empty())
        .collect();

    if categories.is_empty() {
        println!();
        println!("{}", "No items yet. Add one with `rck add <category> <item>`.".dimmed());
        return Ok(());
    }

    for category in categories {
        println!();
        println!("{}", category.name.cyan().bold());
        for (i, item) in category.items.iter().enumerate() {
            println!("  {} {}", format!("{:>2}.", i + 1).dimmed(), item.content);
        }
    }

    Ok(())
}

fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha() {
        assert_eq!(short_sha("0123456789abcdef"), "0123456");
        assert_eq!(short_sha("abc"), "abc");
    }

    #[test]
    fn test_connect_requires_configuration() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let patch = SettingsPatch {
            owner: Some("acme".into()),
            ..SettingsPatch::default()
        };

        match connect(Some(&path), &patch) {
            Err(Error::NotConfigured { missing }) => assert_eq!(missing, vec!["token", "repo"]),
            other => panic!("expected NotConfigured, got {:?}", other.map(|(s, _)| s)),
        }
    }
}
