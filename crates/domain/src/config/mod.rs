mod dispatch;
mod logging;
mod storage;
mod telegram;

pub use dispatch::*;
pub use logging::*;
pub use storage::*;
pub use telegram::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.telegram.token_env.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "telegram.token_env".into(),
                message: "token_env must name an environment variable".into(),
            });
        }

        if self.telegram.api_base_url.trim().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "telegram.api_base_url".into(),
                message: "api_base_url must not be empty".into(),
            });
        }

        if self.telegram.poll_timeout_secs == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "telegram.poll_timeout_secs".into(),
                message: "poll timeout must be greater than 0".into(),
            });
        }

        // The HTTP client gives up before Telegram answers an idle long poll.
        if self.telegram.request_timeout_secs <= self.telegram.poll_timeout_secs {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "telegram.request_timeout_secs".into(),
                message: format!(
                    "request timeout ({}s) should exceed poll timeout ({}s)",
                    self.telegram.request_timeout_secs, self.telegram.poll_timeout_secs,
                ),
            });
        }

        if self.storage.snapshot_path.as_os_str().is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "storage.snapshot_path".into(),
                message: "snapshot_path must not be empty".into(),
            });
        }

        if !self.storage.atomic_writes {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "storage.atomic_writes".into(),
                message: "direct overwrites can leave a truncated snapshot after a crash".into(),
            });
        }

        if self.dispatch.max_in_flight == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "dispatch.max_in_flight".into(),
                message: "max_in_flight must be at least 1".into(),
            });
        }

        errors
    }
}
