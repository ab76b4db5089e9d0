//! Wave scheduler
//!
//! Drives a run through `Idle -> Dispatching -> Collecting -> Deciding` until
//! the pending set is empty, the wave budget is spent, or the run is
//! cancelled. Each wave partitions the pending items into batches, keeps at
//! most `current_workers` of them in flight, and processes results in
//! completion order. The loop itself is sequential; worker tasks only hand
//! reports back.

use super::backoff::wave_backoff;
use super::state::EngineState;
use super::worker::BatchWorker;
use crate::config::EngineConfig;
use crate::core::batch::{
    BatchCodec, BatchReport, DeleteMode, RunReport, SubOutcome, WaveResult, WorkItem,
};
use crate::core::cancellation::CancellationToken;
use crate::core::throttle::AdaptiveThrottle;
use crate::core::transport::BatchTransport;
use crate::utils::error::Result;
use crate::utils::logging::new_run_id;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Progress is logged every this many completed batches
const PROGRESS_EVERY: usize = 5;

/// Orchestrates one purge run over a batch transport
pub struct WaveScheduler {
    worker: BatchWorker,
    config: EngineConfig,
    throttle: AdaptiveThrottle,
}

impl WaveScheduler {
    pub fn new(
        transport: Arc<dyn BatchTransport>,
        config: EngineConfig,
        cancel: CancellationToken,
    ) -> Self {
        let throttle = AdaptiveThrottle::from_config(&config);
        Self {
            worker: BatchWorker {
                transport,
                codec: BatchCodec::new(),
                mode: DeleteMode::from_hard_delete(config.hard_delete),
                cancel,
            },
            config,
            throttle,
        }
    }

    /// Use a codec for a different resource collection
    pub fn with_codec(mut self, codec: BatchCodec) -> Self {
        self.worker.codec = codec;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.worker.cancel
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process `items` to completion, cancellation, or wave-budget exhaustion.
    ///
    /// Per-item failures never fail the run. An auth failure or an
    /// unreadable batch envelope stops dispatch, lets in-flight batches
    /// finish, and is then returned as the error.
    pub async fn run(&self, items: Vec<WorkItem>) -> Result<RunReport> {
        let span = info_span!("purge_run", run_id = %new_run_id());
        self.run_waves(items).instrument(span).await
    }

    async fn run_waves(&self, items: Vec<WorkItem>) -> Result<RunReport> {
        let cancel = &self.worker.cancel;
        let (mut state, duplicates) = EngineState::new(items, &self.config);
        if duplicates > 0 {
            warn!(duplicates, "Ignoring duplicate item ids");
        }

        info!(
            items = state.pending.len(),
            workers = state.current_workers,
            batch_size = state.current_batch_size,
            mode = ?self.worker.mode,
            adaptive = self.throttle.is_enabled(),
            max_waves = self.config.max_waves,
            "Starting purge run"
        );

        let mut fatal = Vec::new();
        let mut waves = 0u32;

        while !state.is_drained() && !cancel.is_cancelled() {
            let wave = self.run_wave(&state).await;
            if wave.batches_dispatched > 0 {
                waves += 1;
            }

            let retry_ratio = wave.retry_ratio();
            let server_hint = wave.server_retry_after;
            state.total_succeeded += wave.succeeded;
            fatal.extend(wave.fatal_items);
            state.pending = wave.retry_items;

            if let Some(error) = wave.abort {
                error!(
                    error = %error,
                    succeeded = state.total_succeeded,
                    unresolved = state.pending.len(),
                    "Purge run aborted"
                );
                return Err(error);
            }

            if state.is_drained()
                || cancel.is_cancelled()
                || state.wave_index >= self.config.max_waves
            {
                break;
            }

            let mut wait = wave_backoff(
                self.config.base_backoff,
                state.wave_index,
                self.config.backoff_jitter,
            );
            if let Some(hint) = server_hint {
                wait = wait.max(hint);
            }

            let decision =
                self.throttle
                    .adjust(state.current_workers, state.current_batch_size, retry_ratio);
            if decision.reduced {
                info!(
                    retry_ratio = %format!("{:.0}%", retry_ratio * 100.0),
                    workers_from = state.current_workers,
                    workers_to = decision.workers,
                    batch_from = state.current_batch_size,
                    batch_to = decision.batch_size,
                    "High retry rate, reducing concurrency"
                );
                wait += decision.extra_pause;
            }
            state.current_workers = decision.workers;
            state.current_batch_size = decision.batch_size;

            info!(
                pending = state.pending.len(),
                wait_secs = %format!("{:.1}", wait.as_secs_f64()),
                "Retrying item(s) after backoff"
            );
            state.wave_index += 1;

            if !cancel.sleep(wait).await {
                break;
            }
        }

        let cancelled = cancel.is_cancelled();
        if !state.pending.is_empty() {
            warn!(
                given_up = state.pending.len(),
                cancelled,
                "Gave up on {} item(s)",
                state.pending.len()
            );
        }
        info!(
            succeeded = state.total_succeeded,
            fatal = fatal.len(),
            given_up = state.pending.len(),
            waves,
            "Purge run finished"
        );

        Ok(RunReport {
            succeeded: state.total_succeeded,
            given_up: state.pending,
            fatal,
            waves,
            cancelled,
            duplicates,
        })
    }

    /// Dispatch and collect one wave
    async fn run_wave(&self, state: &EngineState) -> WaveResult {
        let cancel = &self.worker.cancel;
        let batches = state.partition();
        let total_batches = batches.len();
        let workers = state.current_workers.max(1);
        let started = Instant::now();

        debug!(
            wave = state.wave_index,
            batches = total_batches,
            workers,
            batch_size = state.current_batch_size,
            "Dispatching wave"
        );

        let mut result = WaveResult::default();
        let mut retry_by_batch: Vec<Vec<WorkItem>> = vec![Vec::new(); total_batches];
        let mut fatal_by_batch: Vec<Vec<WorkItem>> = vec![Vec::new(); total_batches];
        let mut unreported = BTreeSet::new();
        let mut queue = batches.into_iter().enumerate().peekable();
        let mut in_flight = JoinSet::new();
        let mut dispatching = true;
        let mut completed = 0usize;
        let mut retried = 0usize;

        loop {
            while dispatching && in_flight.len() < workers {
                if cancel.is_cancelled() {
                    debug!(wave = state.wave_index, "Cancelled, no further batches dispatched");
                    dispatching = false;
                    break;
                }
                let Some((index, items)) = queue.next() else {
                    break;
                };

                result.attempted += items.len();
                result.batches_dispatched += 1;
                unreported.insert(index);
                in_flight.spawn(self.worker.clone().run(index, items));

                if queue.peek().is_some()
                    && !self.config.submit_delay.is_zero()
                    && !cancel.sleep(self.config.submit_delay).await
                {
                    dispatching = false;
                }
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let (index, report) = match joined {
                Ok(done) => done,
                Err(e) => {
                    error!(error = %e, "Batch task did not complete");
                    continue;
                }
            };
            unreported.remove(&index);
            completed += 1;

            match report {
                BatchReport::Completed { items, decoded } => {
                    result.note_retry_after(decoded.retry_after);
                    for (item, outcome) in items.into_iter().zip(decoded.outcomes) {
                        match outcome {
                            SubOutcome::Success => result.succeeded += 1,
                            SubOutcome::Transient { .. } => {
                                retried += 1;
                                retry_by_batch[index].push(item);
                            }
                            SubOutcome::Fatal { .. } => fatal_by_batch[index].push(item),
                        }
                    }
                }
                BatchReport::Failed { items, error } => {
                    if error.is_fatal_for_run() {
                        if result.abort.is_none() {
                            error!(batch = index, error = %error, "Stopping dispatch");
                            result.abort = Some(error);
                        }
                        dispatching = false;
                    } else if error.is_cancelled() {
                        debug!(batch = index, "Batch not sent, run is cancelled");
                    } else {
                        warn!(
                            batch = index,
                            items = items.len(),
                            error = %error,
                            "Batch call failed, items return to the next wave"
                        );
                    }
                    retried += items.len();
                    retry_by_batch[index].extend(items);
                }
            }

            if completed % PROGRESS_EVERY == 0 || completed == total_batches {
                info!(
                    wave = state.wave_index,
                    done = completed,
                    total = total_batches,
                    ok = result.succeeded,
                    retry = retried,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Wave progress"
                );
            }
        }

        for (index, items) in queue {
            retry_by_batch[index] = items;
        }

        // Only reachable if a worker task was torn down without reporting.
        if !unreported.is_empty() {
            let chunks: Vec<&[WorkItem]> =
                state.pending.chunks(state.current_batch_size.max(1)).collect();
            for index in unreported {
                retry_by_batch[index] = chunks[index].to_vec();
            }
        }

        result.retry_items = retry_by_batch.into_iter().flatten().collect();
        result.fatal_items = fatal_by_batch.into_iter().flatten().collect();

        debug!(
            wave = state.wave_index,
            succeeded = result.succeeded,
            retry = result.retry_items.len(),
            fatal = result.fatal_items.len(),
            retry_ratio = result.retry_ratio(),
            "Wave collected"
        );
        result
    }
}

/// Convenience function for a single run without keeping a scheduler around
pub async fn run(
    transport: Arc<dyn BatchTransport>,
    items: Vec<WorkItem>,
    config: EngineConfig,
    cancel: CancellationToken,
) -> Result<RunReport> {
    WaveScheduler::new(transport, config, cancel).run(items).await
}
