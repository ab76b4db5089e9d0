//! Wire types of the listing endpoints

use serde::{Deserialize, Serialize};

/// One page of an OData collection
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailFolder {
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    /// Only present when selected
    #[serde(rename = "totalItemCount", default, skip_serializing_if = "Option::is_none")]
    pub total_item_count: Option<u64>,
}

/// Message projected to `$select=id`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageRef {
    #[serde(default)]
    pub id: Option<String>,
}
