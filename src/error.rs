//! Error types for the review checklist sync engine.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (3=not_found, 4=validation, 5=conflict, etc.)
//! - Retryability flags so callers know when another cycle may succeed
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

/// Result type alias for checklist operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Not Found (exit 3)
    CategoryNotFound,
    ItemNotFound,

    // Validation (exit 4)
    InvalidArgument,

    // Concurrency (exit 5)
    Conflict,

    // Remote (exit 6)
    RemoteError,
    TransportError,
    Timeout,
    DecodeError,

    // Config (exit 7)
    NotConfigured,
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::CategoryNotFound => "CATEGORY_NOT_FOUND",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Conflict => "CONFLICT",
            Self::RemoteError => "REMOTE_ERROR",
            Self::TransportError => "TRANSPORT_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::DecodeError => "DECODE_ERROR",
            Self::NotConfigured => "NOT_CONFIGURED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::CategoryNotFound | Self::ItemNotFound => 3,
            Self::InvalidArgument => 4,
            Self::Conflict => 5,
            Self::RemoteError | Self::TransportError | Self::Timeout | Self::DecodeError => 6,
            Self::NotConfigured | Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether running the same operation again may succeed.
    ///
    /// True for stale revisions and network trouble: a fresh cycle re-reads
    /// the file before writing. False for configuration and lookup errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict | Self::TransportError | Self::Timeout)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while syncing the checklist.
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub settings not configured (missing: {})", missing.join(", "))]
    NotConfigured { missing: Vec<String> },

    #[error("GitHub API error: {status} - {body}")]
    Remote { status: u16, body: String },

    #[error("Conflict: {file} changed on the remote since it was read")]
    Conflict { file: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {seconds}s while {operation}")]
    Timeout { operation: String, seconds: u64 },

    #[error("Could not decode remote file: {0}")]
    Decode(String),

    #[error("Category not found: {category}")]
    CategoryNotFound { category: String },

    /// `index` is zero-based; the message shows the one-based item number.
    #[error("Item not found: {category} #{}", index + 1)]
    ItemNotFound { category: String, index: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotConfigured { .. } => ErrorCode::NotConfigured,
            Self::Remote { .. } => ErrorCode::RemoteError,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Transport(_) => ErrorCode::TransportError,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Decode(_) => ErrorCode::DecodeError,
            Self::CategoryNotFound { .. } => ErrorCode::CategoryNotFound,
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotConfigured { missing } => Some(format!(
                "Set {} with `rck config set` or the GITHUB_TOKEN / RCK_OWNER / RCK_REPO \
                 environment variables.",
                missing.join(", ")
            )),

            Self::Conflict { .. } => Some(
                "Someone else updated the file. Run the command again; it re-reads the \
                 latest revision before writing."
                    .to_string(),
            ),

            Self::Remote { status: 401, .. } => {
                Some("The token was rejected. Check it with `rck check`.".to_string())
            }
            Self::Remote { status: 403, .. } => Some(
                "The token lacks permission for this repository (contents: write is required)."
                    .to_string(),
            ),

            Self::Timeout { .. } | Self::Transport(_) => Some(
                "Check your network connection or raise `request_timeout_secs` in the config."
                    .to_string(),
            ),

            Self::CategoryNotFound { .. } | Self::ItemNotFound { .. } => Some(
                "Use `rck list` to see categories and item numbers.".to_string(),
            ),

            Self::Remote { .. }
            | Self::Decode(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_lists_missing_fields() {
        let err = Error::NotConfigured {
            missing: vec!["token".into(), "owner".into()],
        };
        assert_eq!(
            err.to_string(),
            "GitHub settings not configured (missing: token, owner)"
        );
        assert_eq!(err.exit_code(), 7);
        assert!(err.hint().unwrap().contains("token, owner"));
    }

    #[test]
    fn test_conflict_is_retryable() {
        let err = Error::Conflict {
            file: "acme/web:.github/review-checklist.md".into(),
        };
        assert_eq!(err.error_code(), ErrorCode::Conflict);
        assert!(err.error_code().is_retryable());
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_remote_error_message() {
        let err = Error::Remote {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "GitHub API error: 500 - boom");
        assert!(!err.error_code().is_retryable());
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::ItemNotFound {
            category: "Security".into(),
            index: 4,
        };
        assert_eq!(err.to_string(), "Item not found: Security #5");
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "ITEM_NOT_FOUND");
        assert_eq!(json["error"]["exit_code"], 3);
        assert_eq!(json["error"]["retryable"], false);
        assert!(json["error"]["hint"].is_string());
    }
}
