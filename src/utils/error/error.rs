//! Error handling for the purge engine
//!
//! This module defines all error types used throughout the crate.

#![allow(missing_docs)]

use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, PurgeError>;

/// Main error type for the purge engine
#[derive(Error, Debug)]
pub enum PurgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication errors. Never retried; the caller has to re-authenticate.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The run's cancellation token was set
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// A single call timed out and the caller chose not to retry
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Retry budget for one outbound call was used up
    #[error("Transport retries exhausted after {attempts} attempt(s): {message}")]
    TransportExhausted {
        attempts: u32,
        last_status: Option<u16>,
        message: String,
    },

    /// Non-retryable HTTP status on a plain request
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Batch response envelope could not be decoded at all
    #[error("Codec error: {0}")]
    Codec(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

impl PurgeError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn codec<S: Into<String>>(message: S) -> Self {
        Self::Codec(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    /// Whether the failure of a whole batch call should send its items back
    /// to the pending set for the next wave.
    pub fn is_retryable(&self) -> bool {
        match self {
            PurgeError::TransportExhausted { .. } | PurgeError::Timeout(_) => true,
            PurgeError::HttpClient(e) => e.is_timeout() || e.is_connect(),
            PurgeError::Http { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Errors that unwind the wave loop once in-flight batches have drained.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, PurgeError::Auth(_) | PurgeError::Codec(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PurgeError::Cancelled(_))
    }
}

/// Statuses the remote service uses for throttling and transient faults.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}
