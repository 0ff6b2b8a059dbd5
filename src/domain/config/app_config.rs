//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub endpoint: Option<String>,
    pub task_id: Option<String>,
    pub max_duration: Option<String>,
    pub debounce_ms: Option<u64>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            endpoint: None,
            task_id: None,
            max_duration: Some("60s".to_string()),
            debounce_ms: Some(500),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            endpoint: other.endpoint.or(self.endpoint),
            task_id: other.task_id.or(self.task_id),
            max_duration: other.max_duration.or(self.max_duration),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
        }
    }

    /// Get max_duration as parsed Duration, or the 60s segment limit
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::segment_limit)
    }

    /// Get the hold debounce, or the default 500ms
    pub fn debounce_or_default(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(500))
    }
}
