//! Cooperative cancellation for a purge run
//!
//! One token is created per run and shared by clone with every suspension
//! point: batch submission, the submit delay, transport retry waits and the
//! inter-wave backoff. Setting it never aborts a network call that is already
//! in flight; such a call is bounded only by the HTTP client's request
//! timeout (`http.timeout`), so a run returns once that call answers or
//! times out.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Shared, set-once cancellation flag
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
        }
    }

    /// Set the flag. Returns `true` only for the call that actually flipped it;
    /// the flag is never cleared.
    pub fn cancel(&self) -> bool {
        let flipped = self.state.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        });
        if flipped {
            debug!("Cancellation requested");
        }
        flipped
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolve once the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the full duration elapsed and `false` if the wait was
    /// cut short (or never started) because of cancellation.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        if duration.is_zero() {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_cancelled(),
            _ = self.cancelled() => false,
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancel `token` on Ctrl+C. Later presses are only logged while in-flight
/// batches drain.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if token.cancel() {
                tracing::warn!("Ctrl+C received, finishing in-flight batches before stopping");
            } else {
                tracing::warn!("Already stopping, waiting for in-flight batches");
            }
        }
    })
}
