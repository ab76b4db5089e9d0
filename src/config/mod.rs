//! Configuration management
//!
//! This module handles loading, validation, and management of the engine,
//! HTTP and mailbox configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{PurgeError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Wave engine knobs
    #[serde(default)]
    pub engine: EngineConfig,
    /// Per-call HTTP behaviour
    #[serde(default)]
    pub http: HttpConfig,
    /// Remote mailbox location
    #[serde(default)]
    pub graph: GraphConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PurgeError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse, normalize and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| PurgeError::Config(format!("Failed to parse config: {}", e)))?;

        let config = config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self::default().apply_env()?.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Overlay `MAILPURGE_*` variables (and the legacy `OUTLOOK_*` ones)
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(workers) = env_var(&["MAILPURGE_MAX_WORKERS", "OUTLOOK_MAX_WORKERS"]) {
            self.engine.max_workers = parse_env("max workers", &workers)?;
        }
        if let Some(batch_size) = env_var(&["MAILPURGE_BATCH_SIZE"]) {
            self.engine.batch_size = parse_env("batch size", &batch_size)?;
        }
        if let Some(waves) = env_var(&["MAILPURGE_MAX_WAVES"]) {
            self.engine.max_waves = parse_env("max waves", &waves)?;
        }
        if let Some(adaptive) = env_var(&["MAILPURGE_ADAPTIVE_THROTTLE"]) {
            self.engine.adaptive_throttle = parse_bool(&adaptive);
        }
        if let Some(timeout) = env_var(&["MAILPURGE_TIMEOUT", "OUTLOOK_TIMEOUT"]) {
            let secs: u64 = parse_env("timeout", &timeout)?;
            self.http.timeout = Duration::from_secs(secs);
        }
        if let Some(folder) = env_var(&["MAILPURGE_FOLDER", "OUTLOOK_FOLDER"]) {
            self.graph.folder = folder;
        }
        if let Some(base_url) = env_var(&["MAILPURGE_GRAPH_URL"]) {
            self.graph.base_url = base_url;
        }
        Ok(self)
    }

    /// Clamp every section into the ranges the remote service accepts
    pub fn normalize(mut self) -> Self {
        self.engine = self.engine.normalize();
        self.graph = self.graph.normalize();
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.engine
            .validate()
            .map_err(|e| PurgeError::Config(format!("Engine config error: {}", e)))?;

        self.http
            .validate()
            .map_err(|e| PurgeError::Config(format!("HTTP config error: {}", e)))?;

        self.graph
            .validate()
            .map_err(|e| PurgeError::Config(format!("Mailbox config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}

/// First non-empty value among the given variable names
fn env_var(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
}

fn parse_env<T>(what: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| PurgeError::Config(format!("Invalid {}: {}", what, e)))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
