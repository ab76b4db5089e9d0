//! Per-call retry policy
//!
//! One outbound call is retried on timeouts, connection failures and the
//! throttling statuses (429/500/502/503/504). Attempts are counted from 1;
//! attempt `n` that fails may be followed by another attempt while
//! `n <= max_retries`, after waiting `min(base * 2^n, cap)` (or the server's
//! `Retry-After`, if longer, for status responses).

use crate::config::HttpConfig;
use crate::core::batch::TransportResponse;
use crate::core::cancellation::CancellationToken;
use crate::utils::error::{PurgeError, Result, is_retryable_status};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry budget and backoff shape for one call
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(15),
        }
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
            backoff_cap: config.backoff_cap,
        }
    }
}

impl RetryPolicy {
    /// `min(base * 2^attempt, cap)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.min(31));
        self.backoff_base
            .checked_mul(factor)
            .unwrap_or(self.backoff_cap)
            .min(self.backoff_cap)
    }

    /// Wait before retrying a throttled response: the server hint wins when
    /// it is longer than our own backoff.
    pub fn status_wait(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let backoff = self.backoff(attempt);
        retry_after.map_or(backoff, |hint| hint.max(backoff))
    }

    /// Run `call` until it yields a non-throttled response, the budget is
    /// spent, or `cancel` is set.
    ///
    /// The token is checked before every attempt; a call already in flight
    /// is never interrupted.
    pub async fn execute<F, Fut>(
        &self,
        label: &str,
        cancel: &CancellationToken,
        mut call: F,
    ) -> Result<TransportResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<TransportResponse>>,
    {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(PurgeError::cancelled(format!("{} not sent", label)));
            }
            attempt += 1;

            match call().await {
                Ok(response) if is_retryable_status(response.status) => {
                    if attempt > self.max_retries {
                        return Err(PurgeError::TransportExhausted {
                            attempts: attempt,
                            last_status: Some(response.status),
                            message: format!("{} still throttled", label),
                        });
                    }
                    let wait = self.status_wait(attempt, response.retry_after);
                    warn!(
                        status = response.status,
                        wait_secs = wait.as_secs_f64(),
                        attempt,
                        budget = self.max_retries,
                        "{} throttled, retrying",
                        label
                    );
                    self.pause(label, wait, cancel).await?;
                }
                Ok(response) => {
                    if response.status == 401 {
                        return Err(PurgeError::auth(format!("{} rejected with 401", label)));
                    }
                    debug!(status = response.status, attempt, "{} completed", label);
                    return Ok(response);
                }
                Err(e) if is_network_retryable(&e) => {
                    if attempt > self.max_retries {
                        return Err(PurgeError::TransportExhausted {
                            attempts: attempt,
                            last_status: None,
                            message: format!("{}: {}", label, e),
                        });
                    }
                    let wait = self.backoff(attempt);
                    warn!(
                        error = %e,
                        wait_secs = wait.as_secs_f64(),
                        attempt,
                        budget = self.max_retries,
                        "{} timed out, retrying",
                        label
                    );
                    self.pause(label, wait, cancel).await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn pause(&self, label: &str, wait: Duration, cancel: &CancellationToken) -> Result<()> {
        if cancel.sleep(wait).await {
            Ok(())
        } else {
            Err(PurgeError::cancelled(format!("{} retry abandoned", label)))
        }
    }
}

/// Timeouts and connection failures; the request may not have reached the
/// server, so sending it again is safe for idempotent deletes.
pub fn is_network_retryable(error: &PurgeError) -> bool {
    match error {
        PurgeError::Timeout(_) => true,
        PurgeError::HttpClient(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// Parse a `Retry-After` value: delay seconds or an HTTP date.
pub fn parse_retry_after_value(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    if let Ok(secs) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).ok();
    }
    chrono::DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|at| at.with_timezone(&chrono::Utc) - chrono::Utc::now())
        .and_then(|delta| delta.to_std().ok())
}

/// `Retry-After` of an HTTP response, if present and readable
pub fn retry_after_header(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after_value)
}
