//! Shared HTTP client construction
//!
//! Both the batch transport and the folder/message listing talk to the same
//! host, so they share one connection pool built here.

use crate::config::HttpConfig;
use crate::utils::error::{PurgeError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client pool
#[derive(Debug, Clone)]
pub struct HttpClientPoolConfig {
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// TCP keepalive interval
    pub tcp_keepalive: Duration,
}

impl Default for HttpClientPoolConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            connect_timeout: Duration::from_secs(10),
            tcp_keepalive: Duration::from_secs(60),
        }
    }
}

/// Create the client used for every call of a run.
///
/// The per-request timeout comes from `HttpConfig::timeout`; there is no
/// run-wide deadline.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    let pool = HttpClientPoolConfig::default();
    debug!(timeout_secs = config.timeout.as_secs(), "Creating HTTP client");

    let client = ClientBuilder::new()
        .pool_max_idle_per_host(pool.pool_max_idle_per_host)
        .pool_idle_timeout(pool.pool_idle_timeout)
        .timeout(config.timeout)
        .connect_timeout(pool.connect_timeout.min(config.timeout))
        .tcp_keepalive(pool.tcp_keepalive)
        .tcp_nodelay(true)
        .user_agent(config.user_agent.clone())
        .build()?;

    Ok(client)
}

/// Classify a failed send: timeouts are retryable `Timeout`s, anything else
/// stays a client error for the retry policy to inspect
pub fn map_send_error(e: reqwest::Error) -> PurgeError {
    if e.is_timeout() {
        PurgeError::timeout(e.to_string())
    } else {
        PurgeError::HttpClient(e)
    }
}
