//! Validators for the engine, HTTP and mailbox configuration

use super::trait_def::Validate;
use crate::config::models::*;
use std::time::Duration;
use tracing::debug;

impl Validate for EngineConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating engine configuration");

        if self.max_batch_size == 0 || self.max_batch_size > BATCH_HARD_CAP {
            return Err(format!(
                "max_batch_size must be between 1 and {}",
                BATCH_HARD_CAP
            ));
        }

        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }

        if self.min_batch_size == 0 {
            return Err("min_batch_size must be greater than 0".to_string());
        }

        if self.min_batch_size > self.max_batch_size {
            return Err(format!(
                "min_batch_size ({}) exceeds max_batch_size ({})",
                self.min_batch_size, self.max_batch_size
            ));
        }

        if self.min_batch_size > self.batch_size {
            return Err(format!(
                "min_batch_size ({}) exceeds batch_size ({}); lower min_batch_size or raise batch_size",
                self.min_batch_size, self.batch_size
            ));
        }

        if self.max_workers == 0 {
            return Err("max_workers must be greater than 0".to_string());
        }

        if self.min_workers == 0 {
            return Err("min_workers must be greater than 0".to_string());
        }

        if self.min_workers > self.max_workers {
            return Err(format!(
                "min_workers ({}) exceeds max_workers ({})",
                self.min_workers, self.max_workers
            ));
        }

        if self.max_workers > 64 {
            return Err("max_workers seems too high (>64)".to_string());
        }

        if self.base_backoff > Duration::from_secs(3600) {
            return Err("base_backoff should not exceed 1 hour".to_string());
        }

        Ok(())
    }
}

impl Validate for HttpConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating HTTP configuration");

        if self.timeout.is_zero() {
            return Err("HTTP timeout must be greater than 0".to_string());
        }

        if self.timeout > Duration::from_secs(600) {
            return Err("HTTP timeout should not exceed 10 minutes".to_string());
        }

        if self.backoff_cap.is_zero() {
            return Err("backoff_cap must be greater than 0".to_string());
        }

        if self.max_retries > 20 {
            return Err("max_retries seems too high (>20)".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for GraphConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating mailbox configuration");

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base_url '{}': {}", self.base_url, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("base_url must use http or https, got {}", url.scheme()));
        }

        if self.folder.trim().is_empty() {
            return Err("folder cannot be empty".to_string());
        }

        if self.page_size == 0 || self.page_size > PAGE_SIZE_CAP {
            return Err(format!("page_size must be between 1 and {}", PAGE_SIZE_CAP));
        }

        Ok(())
    }
}
