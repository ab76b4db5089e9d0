//! Batch data model: work items, per-item outcomes and run results

use crate::utils::error::PurgeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Opaque identifier of a remote item to delete
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(String);

impl WorkItem {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkItem {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for WorkItem {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Which remote operation each sub-request performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Move to the deleted-items folder
    #[default]
    Soft,
    /// Permanently delete, skipping deleted items
    Hard,
}

impl DeleteMode {
    pub fn from_hard_delete(hard_delete: bool) -> Self {
        if hard_delete { Self::Hard } else { Self::Soft }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Soft => "deleted",
            Self::Hard => "hard-deleted",
        }
    }
}

/// Result for one item inside a batch response
#[derive(Debug, Clone, PartialEq)]
pub enum SubOutcome {
    Success,
    /// Retried in the next wave
    Transient {
        status: u16,
        retry_after: Option<Duration>,
    },
    /// Dropped for the rest of the run
    Fatal { status: Option<u16>, reason: String },
}

impl SubOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    pub fn fatal<S: Into<String>>(status: Option<u16>, reason: S) -> Self {
        Self::Fatal {
            status,
            reason: reason.into(),
        }
    }
}

/// One sub-request of a `$batch` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRequest {
    pub id: String,
    pub method: String,
    pub url: String,
}

/// Body posted to the batch endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequestBody {
    pub requests: Vec<SubRequest>,
}

impl BatchRequestBody {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// One sub-response of a `$batch` call, parsed leniently
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub headers: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

/// Envelope returned by the batch endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchResponseBody {
    #[serde(default)]
    pub responses: Vec<SubResponse>,
}

/// Raw outcome of one outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// Parsed `Retry-After` of the outer response
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl TransportResponse {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Decoded batch: one outcome per input item, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBatch {
    pub outcomes: Vec<SubOutcome>,
    /// Largest server retry hint seen on the call or its sub-responses
    pub retry_after: Option<Duration>,
}

/// What a worker reports back to the scheduler for one batch
#[derive(Debug)]
pub enum BatchReport {
    Completed {
        items: Vec<WorkItem>,
        decoded: DecodedBatch,
    },
    /// The call as a whole failed; no per-item classification exists
    Failed {
        items: Vec<WorkItem>,
        error: PurgeError,
    },
}

impl BatchReport {
    pub fn items(&self) -> &[WorkItem] {
        match self {
            Self::Completed { items, .. } | Self::Failed { items, .. } => items,
        }
    }
}

/// Aggregate of all batches of one wave
#[derive(Debug, Default)]
pub struct WaveResult {
    pub succeeded: usize,
    /// Items to put back into the pending set
    pub retry_items: Vec<WorkItem>,
    /// Items dropped for good this wave
    pub fatal_items: Vec<WorkItem>,
    pub server_retry_after: Option<Duration>,
    /// Items actually handed to a worker this wave
    pub attempted: usize,
    pub batches_dispatched: usize,
    /// Error that ends the run once this wave has drained
    pub abort: Option<PurgeError>,
}

impl WaveResult {
    /// Share of dispatched items that came back retryable
    pub fn retry_ratio(&self) -> f64 {
        self.retry_items.len() as f64 / self.attempted.max(1) as f64
    }

    pub(crate) fn note_retry_after(&mut self, hint: Option<Duration>) {
        self.server_retry_after = max_hint(self.server_retry_after, hint);
    }
}

/// Larger of two optional retry hints
pub fn max_hint(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Final report of a run.
///
/// Every unique input item ends up in exactly one bucket: counted in
/// `succeeded`, listed in `fatal`, or listed in `given_up`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub succeeded: usize,
    /// Still pending when the run stopped (wave budget spent or cancelled)
    pub given_up: Vec<WorkItem>,
    /// Dropped after a non-retryable per-item failure
    pub fatal: Vec<WorkItem>,
    /// Waves that dispatched at least one batch
    pub waves: u32,
    pub cancelled: bool,
    /// Duplicate input ids that were ignored
    pub duplicates: usize,
}

impl RunReport {
    /// Number of unique items the run accounted for
    pub fn total(&self) -> usize {
        self.succeeded + self.given_up.len() + self.fatal.len()
    }

    /// Everything succeeded or was dropped as fatal; nothing left over
    pub fn is_complete(&self) -> bool {
        self.given_up.is_empty()
    }
}
