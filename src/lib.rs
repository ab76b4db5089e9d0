//! # mailpurge-rs
//!
//! Adaptive parallel batch-delete engine for batched-RPC mail APIs such as
//! the Microsoft Graph `$batch` endpoint.
//!
//! ## Features
//!
//! - **Batching**: packs up to 20 deletes into one call and maps each
//!   sub-response back to its item
//! - **Bounded parallelism**: a fixed pool of in-flight batch calls per wave
//! - **Retry waves**: throttled items are retried in later waves with
//!   exponential backoff and jitter
//! - **Adaptive throttling**: halves workers and batch size while the
//!   service keeps pushing back
//! - **Cooperative cancellation**: Ctrl+C stops dispatch and lets in-flight
//!   calls finish
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mailpurge_rs::{CancellationToken, Config, HttpBatchTransport, WaveScheduler, WorkItem};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let transport = HttpBatchTransport::new(&config.graph.base_url, "token", &config.http)?;
//!     let scheduler = WaveScheduler::new(Arc::new(transport), config.engine, CancellationToken::new());
//!
//!     let report = scheduler
//!         .run(vec![WorkItem::new("AAMkAGI2"), WorkItem::new("AAMkAGI3")])
//!         .await?;
//!     println!("deleted {}, gave up on {}", report.succeeded, report.given_up.len());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod cli;
pub mod graph;
pub mod utils;

// Re-export main types
pub use config::{Config, EngineConfig, GraphConfig, HttpConfig};
pub use core::batch::{BatchCodec, DeleteMode, RunReport, SubOutcome, WorkItem};
pub use core::cancellation::{CancellationToken, cancel_on_ctrl_c};
pub use core::scheduler::{WaveScheduler, run};
pub use core::throttle::AdaptiveThrottle;
pub use core::transport::{BatchTransport, HttpBatchTransport, RetryPolicy};
pub use graph::{GraphItemSource, ItemSource, MessageFilter, StaticTokenProvider, TokenProvider};
pub use utils::error::{PurgeError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name
pub const NAME: &str = env!("CARGO_PKG_NAME");
