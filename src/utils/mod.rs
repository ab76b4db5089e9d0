//! Utility modules
//!
//! Errors, logging setup and HTTP client construction.

pub mod error;
pub mod logging;
pub mod net;
