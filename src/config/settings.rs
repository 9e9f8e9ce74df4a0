//! Sync settings.
//!
//! The core treats [`Settings`] as a read-only value. Loading, merging and
//! saving happen in the parent module on behalf of the command line.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::codec::Dialect;
use crate::error::{Error, Result};
use crate::model::FileKey;

pub const DEFAULT_FILE_PATH: &str = ".github/review-checklist.md";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update review checklist";

/// Connection and behaviour settings for one synced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Personal access token
    pub token: String,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Path of the checklist inside the repository
    pub file_path: String,
    /// REST API root (GitHub Enterprise uses `https://host/api/v3`)
    pub api_base: String,
    /// Commit message used for every write
    pub commit_message: String,
    /// Upper bound for a single remote request
    pub request_timeout_secs: u64,
    /// Auto refresh period
    pub refresh_interval_secs: u64,
    /// Delay before the follow-up refresh after a write (0 disables it)
    pub resync_delay_ms: u64,
    /// Bullet flavour used when rendering
    pub dialect: Dialect,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            file_path: DEFAULT_FILE_PATH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            request_timeout_secs: 30,
            refresh_interval_secs: 30,
            resync_delay_ms: 1500,
            dialect: Dialect::Plain,
        }
    }
}

impl Settings {
    /// Names of the required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<String> {
        [
            ("token", &self.token),
            ("owner", &self.owner),
            ("repo", &self.repo),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// Fail with [`Error::NotConfigured`] unless owner, repo and token are set.
    pub fn ensure_configured(&self) -> Result<()> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::NotConfigured { missing })
        }
    }

    #[must_use]
    pub fn file_key(&self) -> FileKey {
        let path = if self.file_path.trim().is_empty() {
            DEFAULT_FILE_PATH
        } else {
            self.file_path.trim()
        };
        FileKey::new(self.owner.trim(), self.repo.trim(), path)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    #[must_use]
    pub fn resync_delay(&self) -> Option<Duration> {
        (self.resync_delay_ms > 0).then(|| Duration::from_millis(self.resync_delay_ms))
    }

    /// Copy with the token reduced to its last four characters, for display.
    #[must_use]
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        copy.token = mask_token(&self.token);
        copy
    }
}

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

/// Partial settings used for `config set` and command-line overrides.
///
/// `None` fields leave the target untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub file_path: Option<String>,
    pub api_base: Option<String>,
    pub commit_message: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub refresh_interval_secs: Option<u64>,
    pub resync_delay_ms: Option<u64>,
    pub dialect: Option<Dialect>,
}

impl SettingsPatch {
    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch into `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(v) = &self.token {
            settings.token.clone_from(v);
        }
        if let Some(v) = &self.owner {
            settings.owner.clone_from(v);
        }
        if let Some(v) = &self.repo {
            settings.repo.clone_from(v);
        }
        if let Some(v) = &self.file_path {
            settings.file_path.clone_from(v);
        }
        if let Some(v) = &self.api_base {
            settings.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = &self.commit_message {
            settings.commit_message.clone_from(v);
        }
        if let Some(v) = self.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
        if let Some(v) = self.refresh_interval_secs {
            settings.refresh_interval_secs = v;
        }
        if let Some(v) = self.resync_delay_ms {
            settings.resync_delay_ms = v;
        }
        if let Some(v) = self.dialect {
            settings.dialect = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Settings {
        Settings {
            token: "ghp_abcdefghijklmnop".into(),
            owner: "acme".into(),
            repo: "web".into(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.file_path, ".github/review-checklist.md");
        assert_eq!(s.api_base, "https://api.github.com");
        assert_eq!(s.resync_delay(), Some(Duration::from_millis(1500)));
        assert_eq!(s.refresh_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_fields() {
        let s = Settings::default();
        assert_eq!(s.missing_fields(), vec!["token", "owner", "repo"]);
        assert!(matches!(
            s.ensure_configured(),
            Err(Error::NotConfigured { .. })
        ));
        assert!(configured().ensure_configured().is_ok());
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut s = configured();
        s.owner = "   ".into();
        assert_eq!(s.missing_fields(), vec!["owner"]);
    }

    #[test]
    fn test_file_key_falls_back_to_default_path() {
        let mut s = configured();
        s.file_path = String::new();
        assert_eq!(s.file_key().path, DEFAULT_FILE_PATH);
    }

    #[test]
    fn test_masked_token() {
        let masked = configured().masked();
        assert_eq!(masked.token, "****mnop");
        assert_eq!(mask_token("short"), "****");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_patch_apply() {
        let mut s = configured();
        let patch = SettingsPatch {
            repo: Some("api".into()),
            api_base: Some("https://ghe.example.com/api/v3/".into()),
            resync_delay_ms: Some(0),
            dialect: Some(Dialect::TaskList),
            ..SettingsPatch::default()
        };
        assert!(!patch.is_empty());
        patch.apply(&mut s);

        assert_eq!(s.owner, "acme");
        assert_eq!(s.repo, "api");
        assert_eq!(s.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(s.resync_delay(), None);
        assert_eq!(s.dialect, Dialect::TaskList);
    }

    #[test]
    fn test_deserialize_partial_json_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{"owner":"acme","repo":"web"}"#).unwrap();
        assert_eq!(s.owner, "acme");
        assert_eq!(s.file_path, DEFAULT_FILE_PATH);
        assert_eq!(s.request_timeout_secs, 30);
    }
}
