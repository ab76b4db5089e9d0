//! Folder resolution and message listing

use super::auth::TokenProvider;
use super::filter::MessageFilter;
use super::types::{MailFolder, MessageRef, Page};
use crate::config::{Config, GraphConfig, HttpConfig};
use crate::core::batch::{TransportResponse, WorkItem};
use crate::core::cancellation::CancellationToken;
use crate::core::transport::RetryPolicy;
use crate::core::transport::retry::retry_after_header;
use crate::utils::error::{PurgeError, Result};
use crate::utils::net::{create_client, map_send_error};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Folders listed by [`GraphItemSource::sample_folders`] by default
pub const SAMPLE_FOLDER_COUNT: usize = 5;

/// Folder names the service accepts in place of an id
pub const WELL_KNOWN_FOLDERS: [&str; 6] = [
    "inbox",
    "junkemail",
    "deleteditems",
    "archive",
    "drafts",
    "sentitems",
];

/// Produces the ids a run should delete
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Ids matching `filter`, de-duplicated in first-seen order. Stops paging
    /// early (returning what it has) once `cancel` is set.
    async fn list_pending_items(
        &self,
        filter: &MessageFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkItem>>;
}

/// Lists messages of one mail folder through the Graph REST API
pub struct GraphItemSource {
    client: Client,
    base_url: String,
    folder: String,
    page_size: usize,
    tokens: Arc<dyn TokenProvider>,
    policy: RetryPolicy,
    folder_id: OnceCell<String>,
}

impl GraphItemSource {
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let client = create_client(&config.http)?;
        Ok(Self::with_client(client, &config.graph, &config.http, tokens))
    }

    /// Reuse an existing client (and its connection pool)
    pub fn with_client(
        client: Client,
        graph: &GraphConfig,
        http: &HttpConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: graph.base_url.trim_end_matches('/').to_string(),
            folder: graph.folder.clone(),
            page_size: graph.page_size,
            tokens,
            policy: RetryPolicy::from(http),
            folder_id: OnceCell::new(),
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Identifier usable in `/me/mailFolders/{id}/messages`.
    ///
    /// Well-known names pass through unchanged; anything else is looked up
    /// by display name (case-insensitive) across all folder pages. The result
    /// is cached for the lifetime of the source.
    pub async fn resolve_folder_id(&self, cancel: &CancellationToken) -> Result<String> {
        self.folder_id
            .get_or_try_init(|| self.lookup_folder_id(cancel))
            .await
            .cloned()
    }

    async fn lookup_folder_id(&self, cancel: &CancellationToken) -> Result<String> {
        let wanted = self.folder.to_lowercase();
        if WELL_KNOWN_FOLDERS.contains(&wanted.as_str()) {
            return Ok(self.folder.clone());
        }

        let mut url = format!("{}/me/mailFolders", self.base_url);
        let mut query = Some(vec![
            ("$top", "100".to_string()),
            ("$select", "id,displayName".to_string()),
        ]);

        loop {
            let page: Page<MailFolder> = self.get_page(&url, query.take(), cancel).await?;
            if let Some(folder) = page
                .value
                .into_iter()
                .find(|f| f.display_name.to_lowercase() == wanted)
            {
                debug!(folder = %self.folder, id = %folder.id, "Resolved mail folder");
                return Ok(folder.id);
            }
            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        Err(PurgeError::not_found(format!(
            "Mail folder '{}' not found",
            self.folder
        )))
    }

    /// First `limit` mail folders with their item counts.
    ///
    /// A cheap authenticated call for checking that a token works; a
    /// rejected token surfaces as `PurgeError::Auth`.
    pub async fn sample_folders(
        &self,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<MailFolder>> {
        let url = format!("{}/me/mailFolders", self.base_url);
        let query = vec![
            ("$select", "id,displayName,totalItemCount".to_string()),
            ("$top", limit.clamp(1, 100).to_string()),
        ];
        let page: Page<MailFolder> = self.get_page(&url, Some(query), cancel).await?;
        Ok(page.value)
    }

    /// Page through the folder's messages, following `@odata.nextLink`
    pub async fn list_message_ids(
        &self,
        folder_id: &str,
        filter: &MessageFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkItem>> {
        let mut url = format!("{}/me/mailFolders/{}/messages", self.base_url, folder_id);
        let mut params = vec![
            ("$select", "id".to_string()),
            ("$top", self.page_size.to_string()),
        ];
        if let Some(expr) = filter.to_odata() {
            params.push(("$filter", expr));
        }
        let mut query = Some(params);

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut page_no = 0usize;
        let started = Instant::now();

        loop {
            if cancel.is_cancelled() {
                warn!(pages = page_no, found = ids.len(), "Listing cancelled");
                break;
            }
            page_no += 1;

            let page: Page<MessageRef> = match self.get_page(&url, query.take(), cancel).await {
                Ok(page) => page,
                Err(e) if e.is_cancelled() => break,
                Err(e) => return Err(e),
            };

            let received = page.value.len();
            for id in page.value.into_iter().filter_map(|m| m.id) {
                if seen.insert(id.clone()) {
                    ids.push(WorkItem::new(id));
                }
            }
            debug!(
                page = page_no,
                received,
                total = ids.len(),
                elapsed_secs = started.elapsed().as_secs(),
                "Fetched message page"
            );

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(ids)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Option<Vec<(&'static str, String)>>,
        cancel: &CancellationToken,
    ) -> Result<Page<T>> {
        let token = self.tokens.get_bearer_token().await?;
        let response = self
            .policy
            .execute("folder GET", cancel, || {
                self.get_once(url, query.as_deref(), &token)
            })
            .await?;

        match response.status {
            200..=299 => Ok(serde_json::from_str(&response.body)?),
            404 => Err(PurgeError::not_found(format!("{} returned 404", url))),
            status => {
                if status == 400 {
                    warn!(status, body = %response.body, "Listing request rejected as malformed");
                }
                Err(PurgeError::Http {
                    status,
                    body: response.body,
                })
            }
        }
    }

    async fn get_once(
        &self,
        url: &str,
        query: Option<&[(&'static str, String)]>,
        token: &str,
    ) -> Result<TransportResponse> {
        let mut request = self.client.get(url).bearer_auth(token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let retry_after = retry_after_header(response.headers());
        let body = response.text().await.map_err(map_send_error)?;

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}

#[async_trait]
impl ItemSource for GraphItemSource {
    async fn list_pending_items(
        &self,
        filter: &MessageFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<WorkItem>> {
        let folder_id = self.resolve_folder_id(cancel).await?;
        let ids = self.list_message_ids(&folder_id, filter, cancel).await?;
        info!(
            folder = %self.folder,
            sender = filter.sender.as_deref().unwrap_or("*"),
            found = ids.len(),
            "Listed matching messages"
        );
        Ok(ids)
    }
}
