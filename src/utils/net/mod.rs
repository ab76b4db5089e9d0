//! Network utilities
//!
//! This module provides HTTP client construction shared by the transport and
//! the item source.

pub mod http;

pub use http::*;
