//! Error Handling utilities
//!
//! This module provides the crate error type and status classification helpers.

pub mod error;

// Re-export commonly used types and functions
pub use error::*;
