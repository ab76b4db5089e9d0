//! HTTP batch transport integration tests
//!
//! Runs the real transport against a local `wiremock` server.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{envelope, fast_engine, fast_http, items};
    use crate::common::RunReportAssertions;
    use crate::common::transports::item_id;
    use mailpurge_rs::core::batch::{BatchCodec, BatchRequestBody, DeleteMode};
    use mailpurge_rs::utils::error::PurgeError;
    use mailpurge_rs::{BatchTransport, CancellationToken, HttpBatchTransport, WaveScheduler};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Answers every sub-request of the posted batch with `status`
    struct EchoBatch {
        status: u16,
    }

    impl Respond for EchoBatch {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: BatchRequestBody = match serde_json::from_slice(&request.body) {
                Ok(body) => body,
                Err(_) => return ResponseTemplate::new(400),
            };
            let ids: Vec<String> = body.requests.iter().map(|r| item_id(&r.url)).collect();
            ResponseTemplate::new(200).set_body_json(envelope(&ids, |_| self.status))
        }
    }

    fn body_for(n: usize) -> BatchRequestBody {
        BatchCodec::new().encode(&items(n), DeleteMode::Soft)
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    // ==================== Single calls ====================

    /// Posts to `{base}/$batch` with the bearer token and returns the body
    #[tokio::test]
    async fn test_posts_batch_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/$batch"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(EchoBatch { status: 204 })
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "secret", &fast_http(2)).unwrap();
        assert_eq!(transport.endpoint(), format!("{}/$batch", server.uri()));

        let response = transport
            .send(&body_for(3), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let decoded = BatchCodec::new().decode(&items(3), &response).unwrap();
        assert!(decoded.outcomes.iter().all(|o| o.is_success()));
    }

    /// Throttled calls are retried until the service accepts them
    #[tokio::test]
    async fn test_retries_throttled_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(EchoBatch { status: 204 })
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "t", &fast_http(5)).unwrap();
        let response = transport
            .send(&body_for(2), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(request_count(&server).await, 3);
    }

    /// Retry-After on a throttled response is honoured
    #[tokio::test]
    async fn test_honours_retry_after_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "1"))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(EchoBatch { status: 204 })
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "t", &fast_http(3)).unwrap();
        let started = Instant::now();
        transport
            .send(&body_for(1), &CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    /// The retry budget allows `max_retries + 1` attempts in total
    #[tokio::test]
    async fn test_exhausted_budget() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "t", &fast_http(2)).unwrap();
        let err = transport
            .send(&body_for(1), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            PurgeError::TransportExhausted {
                attempts,
                last_status,
                ..
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(last_status, Some(503));
            }
            other => panic!("Expected TransportExhausted, got {:?}", other),
        }
        assert_eq!(request_count(&server).await, 3);
    }

    /// 401 is an auth failure and is not retried
    #[tokio::test]
    async fn test_unauthorized_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "stale", &fast_http(5)).unwrap();
        let err = transport
            .send(&body_for(1), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PurgeError::Auth(_)));
        assert_eq!(request_count(&server).await, 1);
    }

    /// Slow responses time out and count against the budget
    #[tokio::test]
    async fn test_timeouts_are_retried_then_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let mut config = fast_http(1);
        config.timeout = Duration::from_millis(100);
        let transport = HttpBatchTransport::new(&server.uri(), "t", &config).unwrap();

        let err = transport
            .send(&body_for(1), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            PurgeError::TransportExhausted {
                attempts,
                last_status,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(last_status, None);
            }
            other => panic!("Expected TransportExhausted, got {:?}", other),
        }
    }

    /// Nothing is sent once the run is cancelled
    #[tokio::test]
    async fn test_cancelled_before_send() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(EchoBatch { status: 204 })
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let transport = HttpBatchTransport::new(&server.uri(), "t", &fast_http(2)).unwrap();
        let err = transport.send(&body_for(1), &cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(request_count(&server).await, 0);
    }

    // ==================== Full runs ====================

    /// A whole run over HTTP deletes everything in the expected number of calls
    #[tokio::test]
    async fn test_full_run_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/$batch"))
            .respond_with(EchoBatch { status: 204 })
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "t", &fast_http(2)).unwrap();
        let config = fast_engine().with_batch_size(20).with_workers(2);
        let input = items(45);

        let report = WaveScheduler::new(Arc::new(transport), config, CancellationToken::new())
            .run(input.clone())
            .await
            .unwrap();

        report.assert_all_succeeded(45);
        report.assert_conserves(&input);
        assert_eq!(request_count(&server).await, 3);
    }

    /// Rejected batches (400) drop their items as fatal
    #[tokio::test]
    async fn test_bad_request_batch_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "error": { "code": "BadRequest" } })),
            )
            .mount(&server)
            .await;

        let transport = HttpBatchTransport::new(&server.uri(), "t", &fast_http(2)).unwrap();
        let input = items(3);
        let report = WaveScheduler::new(Arc::new(transport), fast_engine(), CancellationToken::new())
            .run(input.clone())
            .await
            .unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.fatal, input);
        assert_eq!(request_count(&server).await, 1);
    }
}
