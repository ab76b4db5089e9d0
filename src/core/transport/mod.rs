//! Rate-limited transport for batch calls
//!
//! The scheduler only sees the [`BatchTransport`] trait; the HTTP
//! implementation handles per-call timeouts, retries and server backoff hints.

mod http;
pub mod retry;


pub use http::HttpBatchTransport;
pub use retry::RetryPolicy;

use crate::core::batch::{BatchRequestBody, TransportResponse};
use crate::core::cancellation::CancellationToken;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Sends one batch call to the remote service.
///
/// Implementations check `cancel` before starting an attempt and return
/// `PurgeError::Cancelled` if it is set, but must let an attempt that has
/// already started run to completion.
#[async_trait]
pub trait BatchTransport: Send + Sync {
    async fn send(
        &self,
        body: &BatchRequestBody,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse>;
}
