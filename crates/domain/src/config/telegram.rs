use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Telegram gateway
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the Telegram Bot API long-poll gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Environment variable holding the bot token.  `serve` refuses to
    /// start when the variable is unset or empty.
    #[serde(default = "d_token_env")]
    pub token_env: String,

    #[serde(default = "d_api_base_url")]
    pub api_base_url: String,

    /// Long-poll timeout passed to `getUpdates`.
    #[serde(default = "d_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// HTTP client timeout.  Must exceed `poll_timeout_secs`.
    #[serde(default = "d_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause after a failed poll before trying again.
    #[serde(default = "d_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: d_token_env(),
            api_base_url: d_api_base_url(),
            poll_timeout_secs: d_poll_timeout_secs(),
            request_timeout_secs: d_request_timeout_secs(),
            retry_backoff_ms: d_retry_backoff_ms(),
        }
    }
}

fn d_token_env() -> String {
    "TELEGRAM_TOKEN".into()
}
fn d_api_base_url() -> String {
    "https://api.telegram.org".into()
}
fn d_poll_timeout_secs() -> u64 {
    60
}
fn d_request_timeout_secs() -> u64 {
    75
}
fn d_retry_backoff_ms() -> u64 {
    1000
}
