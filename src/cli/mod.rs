//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::codec::Dialect;
use crate::config::SettingsPatch;

pub mod commands;

/// Review checklist sync - keep a shared Markdown checklist in a GitHub repo
#[derive(Parser, Debug)]
#[command(name = "rck", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ~/.review-checklist/config.json)
    #[arg(long, global = true, env = "RCK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Repository owner (user or organization)
    #[arg(long, global = true, env = "RCK_OWNER")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, global = true, env = "RCK_REPO")]
    pub repo: Option<String>,

    /// Checklist path inside the repository
    #[arg(long = "file", global = true, env = "RCK_FILE_PATH")]
    pub file_path: Option<String>,

    /// GitHub personal access token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// REST API root (for GitHub Enterprise)
    #[arg(long, global = true, env = "RCK_API_BASE")]
    pub api_base: Option<String>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Connection overrides taken from flags and their environment variables.
    #[must_use]
    pub fn overrides(&self) -> SettingsPatch {
        SettingsPatch {
            token: self.token.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            file_path: self.file_path.clone(),
            api_base: self.api_base.clone(),
            ..SettingsPatch::default()
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the checklist and print it
    List,

    /// Add an item to a category (the category is created if needed)
    Add {
        /// Category heading
        category: String,

        /// Item text
        content: String,
    },

    /// Remove an item by its number within a category
    Remove {
        /// Category heading
        category: String,

        /// Item number as shown by `rck list` (starting at 1)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        index: u32,
    },

    /// Keep refreshing the checklist until interrupted
    Watch {
        /// Refresh period in seconds (default: refresh_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Verify that the token can reach the repository
    Check,

    /// Normalize a local checklist file and print the result
    Fmt {
        /// Markdown file to read (stdin when omitted)
        path: Option<PathBuf>,

        /// Bullet style for the output (plain, task_list)
        #[arg(long, value_parser = parse_dialect)]
        dialect: Option<Dialect>,
    },

    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings (token masked)
    Show,

    /// Store one setting in the config file
    Set {
        /// Setting to change
        #[arg(value_enum)]
        key: ConfigKey,

        /// New value
        value: String,
    },

    /// Print the config file location
    Path,
}

/// Keys accepted by `rck config set`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    Token,
    Owner,
    Repo,
    FilePath,
    ApiBase,
    CommitMessage,
    /// Seconds
    RequestTimeout,
    /// Seconds
    RefreshInterval,
    /// Milliseconds, 0 disables
    ResyncDelay,
    /// plain or task_list
    Dialect,
}

/// Parse a dialect name from the command line.
fn parse_dialect(s: &str) -> std::result::Result<Dialect, String> {
    Dialect::from_arg(s)
        .ok_or_else(|| format!("unknown dialect '{s}' (expected plain or task_list)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_remove_index_starts_at_one() {
        assert!(Cli::try_parse_from(["rck", "remove", "A", "0"]).is_err());
        let cli = Cli::try_parse_from(["rck", "remove", "A", "2"]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { index: 2, .. }));
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::try_parse_from([
            "rck", "--owner", "acme", "--repo", "web", "--file", "docs/list.md", "list",
        ])
        .unwrap();
        let patch = cli.overrides();
        assert_eq!(patch.owner.as_deref(), Some("acme"));
        assert_eq!(patch.repo.as_deref(), Some("web"));
        assert_eq!(patch.file_path.as_deref(), Some("docs/list.md"));
        assert!(patch.commit_message.is_none());
    }

    #[test]
    fn test_dialect_flag() {
        let cli = Cli::try_parse_from(["rck", "fmt", "--dialect", "task-list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Fmt {
                dialect: Some(Dialect::TaskList),
                ..
            }
        ));
        assert!(Cli::try_parse_from(["rck", "fmt", "--dialect", "fancy"]).is_err());
    }

    #[test]
    fn test_config_set_key() {
        let cli = Cli::try_parse_from(["rck", "config", "set", "resync-delay", "0"]).unwrap();
        let Commands::Config {
            command: ConfigCommands::Set { key, value },
        } = cli.command
        else {
            panic!("expected config set");
        };
        assert_eq!(key, ConfigKey::ResyncDelay);
        assert_eq!(value, "0");
    }
}
