//! Logging utilities
//!
//! This module provides subscriber initialisation and log level parsing.

pub mod logging;

// Re-export commonly used types and functions
pub use logging::*;
