//! Scripted batch transports
//!
//! Real objects driven by closures, no mocking framework.

use async_trait::async_trait;
use mailpurge_rs::core::batch::{BatchRequestBody, TransportResponse};
use mailpurge_rs::utils::error::{PurgeError, Result};
use mailpurge_rs::{BatchTransport, CancellationToken};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One batch call as the transport saw it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBatch {
    /// Zero-based call number across the whole run
    pub call: usize,
    /// Item ids, in sub-request order
    pub ids: Vec<String>,
    pub methods: Vec<String>,
    pub urls: Vec<String>,
}

type Responder = dyn Fn(usize, &RecordedBatch) -> Result<TransportResponse> + Send + Sync;

/// Answers each call through a closure and records what was sent
pub struct ScriptedTransport {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    recorded: Mutex<Vec<RecordedBatch>>,
    responder: Box<Responder>,
    latency: Option<std::time::Duration>,
    /// Call number that never answers
    stall_on: Option<usize>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(usize, &RecordedBatch) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Arc::new(Self::build(responder, None))
    }

    /// Like [`ScriptedTransport::new`] but every call takes `latency`
    pub fn with_latency<F>(latency: std::time::Duration, responder: F) -> Arc<Self>
    where
        F: Fn(usize, &RecordedBatch) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Arc::new(Self::build(responder, Some(latency)))
    }

    /// Like [`ScriptedTransport::new`] but call `stall_on` hangs forever,
    /// the way a request with no client timeout would
    pub fn stalling<F>(stall_on: usize, responder: F) -> Arc<Self>
    where
        F: Fn(usize, &RecordedBatch) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            stall_on: Some(stall_on),
            ..Self::build(responder, None)
        })
    }

    fn build<F>(responder: F, latency: Option<std::time::Duration>) -> Self
    where
        F: Fn(usize, &RecordedBatch) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            recorded: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            latency,
            stall_on: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most calls that were ever in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedBatch> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.recorded().iter().map(|b| b.ids.len()).collect()
    }
}

#[async_trait]
impl BatchTransport for ScriptedTransport {
    async fn send(
        &self,
        body: &BatchRequestBody,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse> {
        if cancel.is_cancelled() {
            return Err(PurgeError::cancelled("scripted batch not sent"));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let batch = RecordedBatch {
            call: self.calls.fetch_add(1, Ordering::SeqCst),
            ids: body.requests.iter().map(|r| item_id(&r.url)).collect(),
            methods: body.requests.iter().map(|r| r.method.clone()).collect(),
            urls: body.requests.iter().map(|r| r.url.clone()).collect(),
        };
        self.recorded.lock().unwrap().push(batch.clone());

        if self.stall_on == Some(batch.call) {
            std::future::pending::<()>().await;
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        (self.responder)(batch.call, &batch)
    }
}

/// Item id embedded in a sub-request url
pub fn item_id(url: &str) -> String {
    url.trim_end_matches("/permanentDelete")
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
