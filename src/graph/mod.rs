//! Remote mailbox collaborators
//!
//! Token acquisition, OData filter building and message listing against the
//! Graph REST API. The engine itself only sees work item ids.

pub mod auth;
pub mod client;
pub mod filter;
pub mod types;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::{GraphItemSource, ItemSource, SAMPLE_FOLDER_COUNT, WELL_KNOWN_FOLDERS};
pub use filter::{MessageFilter, odata_datetime};
pub use types::{MailFolder, MessageRef, Page};
