//! One pool slot: encode, send, decode

use crate::core::batch::{BatchCodec, BatchReport, DeleteMode, WorkItem};
use crate::core::cancellation::CancellationToken;
use crate::core::transport::BatchTransport;
use crate::utils::error::PurgeError;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Everything a worker task needs, cloned into each spawned task
#[derive(Clone)]
pub(crate) struct BatchWorker {
    pub(crate) transport: Arc<dyn BatchTransport>,
    pub(crate) codec: BatchCodec,
    pub(crate) mode: DeleteMode,
    pub(crate) cancel: CancellationToken,
}

impl BatchWorker {
    /// Run one batch to a report. Worker tasks never touch engine state; a
    /// panic inside the transport is turned into a whole-batch failure so
    /// its items are not lost.
    pub(crate) async fn run(self, index: usize, items: Vec<WorkItem>) -> (usize, BatchReport) {
        let started = Instant::now();
        let size = items.len();

        let outcome = AssertUnwindSafe(self.execute(&items)).catch_unwind().await;

        let report = match outcome {
            Ok(Ok(decoded)) => BatchReport::Completed { items, decoded },
            Ok(Err(error)) => BatchReport::Failed { items, error },
            Err(_) => BatchReport::Failed {
                items,
                error: PurgeError::TransportExhausted {
                    attempts: 0,
                    last_status: None,
                    message: "batch worker panicked".to_string(),
                },
            },
        };

        debug!(
            batch = index,
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch finished"
        );
        (index, report)
    }

    async fn execute(
        &self,
        items: &[WorkItem],
    ) -> crate::utils::error::Result<crate::core::batch::DecodedBatch> {
        let body = self.codec.encode(items, self.mode);
        let response = self.transport.send(&body, &self.cancel).await?;
        self.codec.decode(items, &response)
    }
}
