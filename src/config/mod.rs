//! Configuration management.
//!
//! Settings live in `~/.review-checklist/config.json`. The file is only
//! read and written here; the sync engine receives a finished [`Settings`]
//! value and never persists it.
//!
//! Resolution order for each field:
//! 1. Command-line flag or its environment variable (`GITHUB_TOKEN`, `RCK_OWNER`, ...)
//! 2. Config file
//! 3. Built-in default

mod settings;

pub use settings::{
    Settings, SettingsPatch, DEFAULT_API_BASE, DEFAULT_COMMIT_MESSAGE, DEFAULT_FILE_PATH,
};

use crate::error::{Error, Result};

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Get the global config directory location.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".review-checklist"))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. `explicit_path` (the `--config` flag)
/// 2. `RCK_CONFIG` environment variable
/// 3. `~/.review-checklist/config.json`
pub fn config_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var("RCK_CONFIG") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    global_config_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Load settings from `path`, falling back to defaults when it does not exist.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Write settings to `path`.
///
/// The file holds a token, so it is created owner-readable only and
/// replaced atomically.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    atomic_write(path, &content)
        .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))
}

/// Merge `patch` into the stored settings and save the result.
pub fn update_settings(path: &Path, patch: &SettingsPatch) -> Result<Settings> {
    let mut settings = load_settings_from(path)?;
    patch.apply(&mut settings);
    save_settings_to(path, &settings)?;
    Ok(settings)
}

/// Load stored settings and layer command-line overrides on top.
pub fn resolve_settings(
    explicit_path: Option<&Path>,
    overrides: &SettingsPatch,
) -> Result<Settings> {
    let path = config_path(explicit_path)?;
    let mut settings = load_settings_from(&path)?;
    overrides.apply(&mut settings);
    Ok(settings)
}

fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let file: File = options.open(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)
}
