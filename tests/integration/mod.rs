//! Integration tests for mailpurge-rs
//!
//! These tests drive the public API across module boundaries: scheduler,
//! codec and transport together, and the HTTP pieces against local servers.

pub mod config_tests;
pub mod http_transport_tests;
