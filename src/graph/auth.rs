//! Bearer token providers

use crate::utils::error::{PurgeError, Result};
use async_trait::async_trait;
use std::env;
use std::fmt;

/// Environment variables checked for a pre-acquired token, in order
pub const TOKEN_ENV_VARS: [&str; 2] = ["MAILPURGE_ACCESS_TOKEN", "OUTLOOK_ACCESS_TOKEN"];

/// Source of the bearer token sent with every call
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_bearer_token(&self) -> Result<String>;
}

/// A token acquired outside this tool
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new<S: Into<String>>(token: S) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(PurgeError::auth("access token is empty"));
        }
        Ok(Self { token })
    }

    /// Read the token from the first non-empty variable in [`TOKEN_ENV_VARS`]
    pub fn from_env() -> Result<Self> {
        TOKEN_ENV_VARS
            .iter()
            .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
            .map(Self::new)
            .unwrap_or_else(|| {
                Err(PurgeError::auth(format!(
                    "no access token; pass --access-token or set {}",
                    TOKEN_ENV_VARS.join(" / ")
                )))
            })
    }

    /// Explicit token if given, otherwise the environment
    pub fn resolve(explicit: Option<String>) -> Result<Self> {
        match explicit {
            Some(token) => Self::new(token),
            None => Self::from_env(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
