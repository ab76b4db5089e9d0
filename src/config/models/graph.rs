//! Remote mailbox configuration

use super::PAGE_SIZE_CAP;
use serde::{Deserialize, Serialize};

/// Where the mailbox API lives and how listing pages are sized
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphConfig {
    /// API root, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Folder display name or well-known name
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Messages per listing page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            folder: default_folder(),
            page_size: default_page_size(),
        }
    }
}

impl GraphConfig {
    /// Out-of-range page sizes fall back to the remote maximum.
    pub fn normalize(mut self) -> Self {
        if self.page_size == 0 || self.page_size > PAGE_SIZE_CAP {
            self.page_size = PAGE_SIZE_CAP;
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self
    }
}

fn default_base_url() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_folder() -> String {
    "Inbox".to_string()
}

fn default_page_size() -> usize {
    PAGE_SIZE_CAP
}
