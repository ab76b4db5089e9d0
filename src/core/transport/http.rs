//! HTTP batch transport

use super::BatchTransport;
use super::retry::{RetryPolicy, retry_after_header};
use crate::config::HttpConfig;
use crate::core::batch::{BatchRequestBody, TransportResponse};
use crate::core::cancellation::CancellationToken;
use crate::utils::error::Result;
use crate::utils::net::{create_client, map_send_error};
use async_trait::async_trait;
use reqwest::Client;
use tracing::trace;

/// Posts batch bodies to `{base_url}/$batch` with a bearer token
#[derive(Debug, Clone)]
pub struct HttpBatchTransport {
    client: Client,
    endpoint: String,
    token: String,
    policy: RetryPolicy,
}

impl HttpBatchTransport {
    pub fn new(base_url: &str, token: impl Into<String>, config: &HttpConfig) -> Result<Self> {
        Ok(Self::with_client(create_client(config)?, base_url, token, config))
    }

    /// Reuse an existing client (and its connection pool)
    pub fn with_client(
        client: Client,
        base_url: &str,
        token: impl Into<String>,
        config: &HttpConfig,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/$batch", base_url.trim_end_matches('/')),
            token: token.into(),
            policy: RetryPolicy::from(config),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_once(&self, body: &BatchRequestBody) -> Result<TransportResponse> {
        trace!(endpoint = %self.endpoint, ops = body.len(), "POST batch");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status().as_u16();
        let retry_after = retry_after_header(response.headers());
        let body = response.text().await.map_err(map_send_error)?;

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}

#[async_trait]
impl BatchTransport for HttpBatchTransport {
    async fn send(
        &self,
        body: &BatchRequestBody,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        self.policy
            .execute("batch POST", cancel, || self.post_once(body))
            .await
    }
}
