//! Batch data model and the `$batch` wire codec
//!
//! This module packs work items into batch calls and unpacks the per-item
//! outcomes from their responses.

mod codec;
mod types;


// Re-export all public types
pub use codec::{BatchCodec, classify_status};
pub use types::{
    BatchReport, BatchRequestBody, BatchResponseBody, DecodedBatch, DeleteMode, RunReport,
    SubOutcome, SubRequest, SubResponse, TransportResponse, WaveResult, WorkItem, max_hint,
};
