//! Configuration data models
//!
//! This module defines all configuration structures used by the engine and
//! its collaborators.

#![allow(missing_docs)]

pub mod engine;
pub mod graph;
pub mod http;

// Re-export all configuration types
pub use engine::*;
pub use graph::*;
pub use http::*;

/// Remote `$batch` cap on sub-requests per call
pub const BATCH_HARD_CAP: usize = 20;

/// Remote cap on `$top` page size
pub const PAGE_SIZE_CAP: usize = 100;

/// Serde helpers for durations written as (fractional) seconds in YAML
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
