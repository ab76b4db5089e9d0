//! Wave scheduler for bulk batch deletes
//!
//! This module drives a run: batching, bounded parallel dispatch, per-wave
//! retry with backoff, and adaptive throttling between waves.

mod backoff;
mod engine;
mod state;
mod worker;


pub use backoff::{MAX_WAVE_EXPONENT, wave_backoff, wave_backoff_with};
pub use engine::{WaveScheduler, run};
pub use state::EngineState;
