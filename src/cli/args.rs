//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// Trivox - press-and-hold voice segment recorder
#[derive(Parser, Debug)]
#[command(name = "trivox")]
#[command(version)]
#[command(about = "Record three voice segments and upload them to remote storage")]
#[command(long_about = None)]
pub struct Cli {
    /// Upload endpoint URL
    #[arg(short, long, value_name = "URL", env = "TRIVOX_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Task identifier issued by the verification step
    #[arg(short, long, value_name = "ID", env = "TRIVOX_TASK_ID")]
    pub task_id: Option<String>,

    /// Per-segment recording limit (e.g., 45s, 1m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// Show all config values
    Show,
    /// Show config file path
    Path,
}

/// Keys accepted by `config set`/`config get`
pub const VALID_CONFIG_KEYS: &[&str] = &["endpoint", "task_id", "max_duration", "debounce_ms"];

/// Check whether a key is a known config key
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn known_keys_validate() {
        assert!(is_valid_config_key("endpoint"));
        assert!(is_valid_config_key("debounce_ms"));
        assert!(!is_valid_config_key("api_key"));
        assert!(!is_valid_config_key(""));
    }

    #[test]
    fn parses_record_flags() {
        let cli = Cli::parse_from([
            "trivox",
            "--endpoint",
            "https://store.example/upload",
            "--task-id",
            "task-3",
            "--max-duration",
            "45s",
        ]);
        assert_eq!(cli.endpoint.as_deref(), Some("https://store.example/upload"));
        assert_eq!(cli.task_id.as_deref(), Some("task-3"));
        assert_eq!(cli.max_duration.as_deref(), Some("45s"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_config_subcommand() {
        let cli = Cli::parse_from(["trivox", "config", "set", "endpoint", "https://x.example"]);
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Set { key, value },
            }) => {
                assert_eq!(key, "endpoint");
                assert_eq!(value, "https://x.example");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
