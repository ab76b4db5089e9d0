//! Common test utilities for mailpurge-rs
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{fixtures, transports::ScriptedTransport};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let transport = ScriptedTransport::new(|_, batch| fixtures::respond_all(batch, 204));
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod transports;

pub use assertions::RunReportAssertions;
pub use transports::{RecordedBatch, ScriptedTransport};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
