//! Wave engine configuration

use super::{BATCH_HARD_CAP, duration_secs};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Knobs for one engine run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Items per batch call at the start of the run
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Concurrent batch calls at the start of the run
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Floor for workers when adaptive throttling shrinks the pool
    #[serde(default = "default_min_workers")]
    pub min_workers: usize,
    /// Floor for batch size when adaptive throttling shrinks batches
    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: usize,
    /// Remote cap on sub-requests per call; never exceeded
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    /// Last wave index that may still run (wave 0 is the first pass)
    #[serde(default = "default_max_waves")]
    pub max_waves: u32,
    /// Base wait between waves, doubled per wave up to 2^6
    #[serde(default = "default_base_backoff", with = "duration_secs")]
    pub base_backoff: Duration,
    /// Upper bound of the uniform jitter added to each inter-wave wait
    #[serde(default = "default_backoff_jitter", with = "duration_secs")]
    pub backoff_jitter: Duration,
    /// Extra wait after the throttle controller shrank the pool
    #[serde(default = "default_throttle_pause", with = "duration_secs")]
    pub throttle_pause: Duration,
    /// Pause between successive batch submissions
    #[serde(default, with = "duration_secs")]
    pub submit_delay: Duration,
    /// Shrink workers and batch size under sustained throttling
    #[serde(default)]
    pub adaptive_throttle: bool,
    /// Permanent delete instead of move-to-deleted-items
    #[serde(default)]
    pub hard_delete: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_workers: default_max_workers(),
            min_workers: default_min_workers(),
            min_batch_size: default_min_batch_size(),
            max_batch_size: default_max_batch_size(),
            max_waves: default_max_waves(),
            base_backoff: default_base_backoff(),
            backoff_jitter: default_backoff_jitter(),
            throttle_pause: default_throttle_pause(),
            submit_delay: Duration::ZERO,
            adaptive_throttle: false,
            hard_delete: false,
        }
    }
}

impl EngineConfig {
    /// Clamp sizes into the ranges the remote service accepts.
    ///
    /// Mirrors the bounds the command line applies: batch sizes within
    /// `1..=max_batch_size`, worker floors at least 1.
    pub fn normalize(mut self) -> Self {
        self.max_batch_size = self.max_batch_size.clamp(1, BATCH_HARD_CAP);
        self.batch_size = self.batch_size.clamp(1, self.max_batch_size);
        self.min_batch_size = self.min_batch_size.clamp(1, self.max_batch_size);
        self.min_workers = self.min_workers.max(1);
        self.max_workers = self.max_workers.max(1);
        self
    }

    /// Largest batch the remote service accepts
    pub fn batch_cap(&self) -> usize {
        self.max_batch_size.clamp(1, BATCH_HARD_CAP)
    }

    /// Smallest batch the throttle may shrink to, never above the cap
    pub fn batch_floor(&self) -> usize {
        self.min_batch_size.clamp(1, self.batch_cap())
    }

    pub fn worker_floor(&self) -> usize {
        self.min_workers.max(1)
    }

    /// Batch size the first wave uses, within `[batch_floor, batch_cap]`
    pub fn initial_batch_size(&self) -> usize {
        self.batch_size.clamp(self.batch_floor(), self.batch_cap())
    }

    /// Worker count the first wave uses, at least `worker_floor`
    pub fn initial_workers(&self) -> usize {
        self.max_workers.max(self.worker_floor())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_minimums(mut self, min_workers: usize, min_batch_size: usize) -> Self {
        self.min_workers = min_workers;
        self.min_batch_size = min_batch_size;
        self
    }

    pub fn with_max_waves(mut self, max_waves: u32) -> Self {
        self.max_waves = max_waves;
        self
    }

    /// Set every inter-wave wait component at once
    pub fn with_backoff(mut self, base: Duration, jitter: Duration, throttle_pause: Duration) -> Self {
        self.base_backoff = base;
        self.backoff_jitter = jitter;
        self.throttle_pause = throttle_pause;
        self
    }

    pub fn with_submit_delay(mut self, submit_delay: Duration) -> Self {
        self.submit_delay = submit_delay;
        self
    }

    pub fn with_adaptive_throttle(mut self, enabled: bool) -> Self {
        self.adaptive_throttle = enabled;
        self
    }

    pub fn with_hard_delete(mut self, enabled: bool) -> Self {
        self.hard_delete = enabled;
        self
    }
}

fn default_batch_size() -> usize {
    BATCH_HARD_CAP
}

fn default_max_workers() -> usize {
    6
}

fn default_min_workers() -> usize {
    1
}

fn default_min_batch_size() -> usize {
    5
}

fn default_max_batch_size() -> usize {
    BATCH_HARD_CAP
}

fn default_max_waves() -> u32 {
    6
}

fn default_base_backoff() -> Duration {
    Duration::from_secs(5)
}

fn default_backoff_jitter() -> Duration {
    Duration::from_millis(1500)
}

fn default_throttle_pause() -> Duration {
    Duration::from_secs(5)
}
