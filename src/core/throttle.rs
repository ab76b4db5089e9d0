//! Adaptive throttle controller
//!
//! Looks at the retry ratio of a finished wave and, when the remote service
//! is pushing back, halves the worker count and batch size for the next wave.
//! Reductions are one-directional for the lifetime of a run.

use crate::config::EngineConfig;
use std::time::Duration;

/// Retry ratio at or above which the pool is shrunk
pub const RETRY_RATIO_THRESHOLD: f64 = 0.15;

/// Pool parameters for the next wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleDecision {
    pub workers: usize,
    pub batch_size: usize,
    /// Added on top of the wave backoff when anything was reduced
    pub extra_pause: Duration,
    pub reduced: bool,
}

impl ThrottleDecision {
    fn unchanged(workers: usize, batch_size: usize) -> Self {
        Self {
            workers,
            batch_size,
            extra_pause: Duration::ZERO,
            reduced: false,
        }
    }
}

/// Halving controller with caller-supplied floors
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveThrottle {
    enabled: bool,
    min_workers: usize,
    min_batch_size: usize,
    threshold: f64,
    pause: Duration,
}

impl AdaptiveThrottle {
    pub fn new(min_workers: usize, min_batch_size: usize, pause: Duration) -> Self {
        Self {
            enabled: true,
            min_workers: min_workers.max(1),
            min_batch_size: min_batch_size.max(1),
            threshold: RETRY_RATIO_THRESHOLD,
            pause,
        }
    }

    /// Controller as configured for a run; inert unless adaptive mode is on
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            enabled: config.adaptive_throttle,
            ..Self::new(config.worker_floor(), config.batch_floor(), config.throttle_pause)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Decide the next wave's workers and batch size.
    ///
    /// Below the threshold (or when disabled) the inputs come back unchanged.
    /// Otherwise both are halved with ceiling division and floored at the
    /// minimums, but never raised above their current values.
    pub fn adjust(&self, workers: usize, batch_size: usize, retry_ratio: f64) -> ThrottleDecision {
        if !self.enabled || retry_ratio.is_nan() || retry_ratio < self.threshold {
            return ThrottleDecision::unchanged(workers, batch_size);
        }

        let new_workers = workers.div_ceil(2).max(self.min_workers).min(workers);
        let new_batch_size = batch_size.div_ceil(2).max(self.min_batch_size).min(batch_size);
        let reduced = new_workers < workers || new_batch_size < batch_size;

        ThrottleDecision {
            workers: new_workers,
            batch_size: new_batch_size,
            extra_pause: if reduced { self.pause } else { Duration::ZERO },
            reduced,
        }
    }
}
