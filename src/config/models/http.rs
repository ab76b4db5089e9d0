//! Outbound HTTP configuration

use super::duration_secs;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call timeout and retry budget for the transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Timeout for one network call
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Unit of the exponential per-call backoff (`base * 2^attempt`)
    #[serde(default = "default_backoff_base", with = "duration_secs")]
    pub backoff_base: Duration,
    /// Cap for the exponential per-call backoff
    #[serde(default = "default_backoff_cap", with = "duration_secs")]
    pub backoff_cap: Duration,
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            backoff_base: default_backoff_base(),
            backoff_cap: default_backoff_cap(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base() -> Duration {
    Duration::from_secs(1)
}

fn default_backoff_cap() -> Duration {
    Duration::from_secs(15)
}

fn default_user_agent() -> String {
    format!("mailpurge-rs/{}", env!("CARGO_PKG_VERSION"))
}
