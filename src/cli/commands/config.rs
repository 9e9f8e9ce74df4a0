//! Config command implementations.

use std::path::Path;

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::cli::{ConfigCommands, ConfigKey};
use crate::codec::Dialect;
use crate::config::{config_path, resolve_settings, update_settings, Settings, SettingsPatch};
use crate::error::{Error, Result};

#[derive(Serialize)]
struct ShowOutput<'a> {
    path: String,
    settings: &'a Settings,
    missing: Vec<String>,
}

/// Execute config commands.
pub fn execute(
    command: &ConfigCommands,
    config: Option<&Path>,
    overrides: &SettingsPatch,
    json: bool,
) -> Result<()> {
    match command {
        ConfigCommands::Show => show(config, overrides, json),
        ConfigCommands::Set { key, value } => set(*key, value, config, json),
        ConfigCommands::Path => path(config, json),
    }
}

fn show(config: Option<&Path>, overrides: &SettingsPatch, json: bool) -> Result<()> {
    let path = config_path(config)?;
    let settings = resolve_settings(config, overrides)?;
    let masked = settings.masked();
    let missing = settings.missing_fields();

    if json {
        let output = ShowOutput {
            path: path.display().to_string(),
            settings: &masked,
            missing,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", path.display().to_string().dimmed());
    let rows = [
        ("token", masked.token.clone()),
        ("owner", masked.owner.clone()),
        ("repo", masked.repo.clone()),
        ("file_path", masked.file_path.clone()),
        ("api_base", masked.api_base.clone()),
        ("commit_message", masked.commit_message.clone()),
        ("request_timeout_secs", masked.request_timeout_secs.to_string()),
        ("refresh_interval_secs", masked.refresh_interval_secs.to_string()),
        ("resync_delay_ms", masked.resync_delay_ms.to_string()),
        ("dialect", masked.dialect.to_string()),
    ];
    for (name, value) in rows {
        if value.is_empty() {
            println!("  {name:<22} {}", "(not set)".yellow());
        } else {
            println!("  {name:<22} {value}");
        }
    }

    if !missing.is_empty() {
        println!();
        println!(
            "{} set {} before syncing",
            "Incomplete:".yellow(),
            missing.join(", ")
        );
    }

    Ok(())
}

fn set(key: ConfigKey, value: &str, config: Option<&Path>, json: bool) -> Result<()> {
    let path = config_path(config)?;
    let patch = patch_for(key, value)?;
    let settings = update_settings(&path, &patch)?;

    if json {
        let output = ShowOutput {
            path: path.display().to_string(),
            settings: &settings.masked(),
            missing: settings.missing_fields(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let name = key
            .to_possible_value()
            .map_or_else(|| format!("{key:?}"), |v| v.get_name().to_string());
        println!("{} {name} in {}", "Updated".green(), path.display());
    }

    Ok(())
}

fn path(config: Option<&Path>, json: bool) -> Result<()> {
    let path = config_path(config)?;
    if json {
        println!("{}", serde_json::json!({ "path": path.display().to_string() }));
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

/// Translate one `key value` pair into a settings patch.
fn patch_for(key: ConfigKey, value: &str) -> Result<SettingsPatch> {
    let value = value.trim();
    let text = || Some(value.to_string());
    let number = |unit: &str| {
        value.parse::<u64>().map(Some).map_err(|_| {
            Error::InvalidArgument(format!("{value:?} is not a whole number of {unit}"))
        })
    };

    let mut patch = SettingsPatch::default();
    match key {
        ConfigKey::Token => patch.token = text(),
        ConfigKey::Owner => patch.owner = text(),
        ConfigKey::Repo => patch.repo = text(),
        ConfigKey::FilePath => patch.file_path = text(),
        ConfigKey::ApiBase => patch.api_base = text(),
        ConfigKey::CommitMessage => {
            if value.is_empty() {
                return Err(Error::InvalidArgument(
                    "commit message must not be empty".into(),
                ));
            }
            patch.commit_message = text();
        }
        ConfigKey::RequestTimeout => patch.request_timeout_secs = number("seconds")?,
        ConfigKey::RefreshInterval => patch.refresh_interval_secs = number("seconds")?,
        ConfigKey::ResyncDelay => patch.resync_delay_ms = number("milliseconds")?,
        ConfigKey::Dialect => {
            patch.dialect = Some(Dialect::from_arg(value).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown dialect '{value}' (expected plain or task_list)"
                ))
            })?);
        }
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_settings_from;
    use tempfile::TempDir;

    #[test]
    fn test_patch_for_text_and_numbers() {
        let patch = patch_for(ConfigKey::Owner, "  acme ").unwrap();
        assert_eq!(patch.owner.as_deref(), Some("acme"));

        let patch = patch_for(ConfigKey::ResyncDelay, "0").unwrap();
        assert_eq!(patch.resync_delay_ms, Some(0));

        assert!(matches!(
            patch_for(ConfigKey::RequestTimeout, "soon"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_patch_for_dialect() {
        let patch = patch_for(ConfigKey::Dialect, "task_list").unwrap();
        assert_eq!(patch.dialect, Some(Dialect::TaskList));
        assert!(patch_for(ConfigKey::Dialect, "fancy").is_err());
    }

    #[test]
    fn test_set_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        set(ConfigKey::Repo, "web", Some(&path), true).unwrap();
        set(ConfigKey::RefreshInterval, "10", Some(&path), true).unwrap();

        let stored = load_settings_from(&path).unwrap();
        assert_eq!(stored.repo, "web");
        assert_eq!(stored.refresh_interval_secs, 10);
    }
}
