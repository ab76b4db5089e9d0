//! Wait between waves

use rand::Rng;
use std::time::Duration;

/// Highest exponent applied to the base wait
pub const MAX_WAVE_EXPONENT: u32 = 6;

/// `base * 2^min(wave, 6) + uniform(0, jitter)`
pub fn wave_backoff(base: Duration, wave_index: u32, jitter: Duration) -> Duration {
    let jitter_sample = if jitter.is_zero() {
        Duration::ZERO
    } else {
        jitter.mul_f64(rand::thread_rng().gen_range(0.0..=1.0))
    };
    wave_backoff_with(base, wave_index, jitter_sample)
}

/// Deterministic part of [`wave_backoff`] plus an already drawn jitter
pub fn wave_backoff_with(base: Duration, wave_index: u32, jitter_sample: Duration) -> Duration {
    let factor = 1u32 << wave_index.min(MAX_WAVE_EXPONENT);
    base.saturating_mul(factor).saturating_add(jitter_sample)
}
