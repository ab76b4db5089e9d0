//! Core engine
//!
//! Batch data model and codec, the transport seam, cancellation, the
//! adaptive throttle, and the wave scheduler that ties them together.

pub mod batch;
pub mod cancellation;
pub mod scheduler;
pub mod throttle;
pub mod transport;

pub use batch::{BatchCodec, DeleteMode, RunReport, WorkItem};
pub use cancellation::CancellationToken;
pub use scheduler::WaveScheduler;
pub use throttle::AdaptiveThrottle;
pub use transport::{BatchTransport, HttpBatchTransport, RetryPolicy};
