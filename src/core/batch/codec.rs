//! `$batch` request encoding and response decoding
//!
//! The codec only knows how to build N sub-requests and read N sub-responses
//! back; which verb each sub-request uses comes from [`DeleteMode`].

use super::types::*;
use crate::core::transport::retry::parse_retry_after_value;
use crate::utils::error::{PurgeError, Result, is_retryable_status};
use std::time::Duration;
use tracing::{debug, warn};

const BODY_SNIPPET_LEN: usize = 512;

/// Builds and parses batch calls for one resource collection
#[derive(Debug, Clone)]
pub struct BatchCodec {
    resource_path: String,
}

impl Default for BatchCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchCodec {
    /// Codec for the signed-in user's messages
    pub fn new() -> Self {
        Self::with_resource_path("/me/messages")
    }

    pub fn with_resource_path<S: Into<String>>(path: S) -> Self {
        Self {
            resource_path: path.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build one sub-request per item; sub-request ids are 1-based positions.
    pub fn encode(&self, items: &[WorkItem], mode: DeleteMode) -> BatchRequestBody {
        let requests = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let (method, url) = match mode {
                    DeleteMode::Soft => ("DELETE", format!("{}/{}", self.resource_path, item)),
                    DeleteMode::Hard => (
                        "POST",
                        format!("{}/{}/permanentDelete", self.resource_path, item),
                    ),
                };
                SubRequest {
                    id: (index + 1).to_string(),
                    method: method.to_string(),
                    url,
                }
            })
            .collect();

        BatchRequestBody { requests }
    }

    /// Turn a batch response into one outcome per item, aligned with `items`.
    ///
    /// A missing or malformed sub-response only makes its own position
    /// `Fatal`. An outer 401 is an auth failure; an envelope that is not JSON
    /// at all is a codec error.
    pub fn decode(&self, items: &[WorkItem], response: &TransportResponse) -> Result<DecodedBatch> {
        if response.status == 401 {
            return Err(PurgeError::auth(format!(
                "batch call rejected with 401: {}",
                snippet(&response.body)
            )));
        }

        if !response.is_success() {
            return Ok(self.decode_outer_failure(items, response));
        }

        let envelope: BatchResponseBody = serde_json::from_str(&response.body).map_err(|e| {
            PurgeError::codec(format!(
                "unreadable batch envelope ({}): {}",
                e,
                snippet(&response.body)
            ))
        })?;

        let mut slots: Vec<Option<SubOutcome>> = vec![None; items.len()];
        let mut retry_after = response.retry_after;

        for (index, sub) in envelope.responses.iter().enumerate() {
            let Some(position) = self.position_of(sub, index, items.len()) else {
                continue;
            };

            if slots[position].is_some() {
                warn!(
                    item = %items[position],
                    sub_id = ?sub.id,
                    "Duplicate sub-response ignored"
                );
                continue;
            }

            let hint = sub_retry_after(sub);
            let outcome = match sub.status {
                Some(status) => classify_status(status, hint, sub.body.as_ref()),
                None => SubOutcome::fatal(None, "sub-response without status"),
            };

            match &outcome {
                SubOutcome::Transient { .. } => {
                    retry_after = max_hint(retry_after, hint);
                }
                SubOutcome::Fatal { status, reason } => {
                    warn!(
                        item = %items[position],
                        status = ?status,
                        reason = %reason,
                        "Delete failed"
                    );
                }
                SubOutcome::Success => {
                    if sub.status == Some(404) {
                        debug!(item = %items[position], "Item already gone, counted as deleted");
                    }
                }
            }

            slots[position] = Some(outcome);
        }

        let outcomes = slots
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.unwrap_or_else(|| {
                    warn!(item = %items[position], "Delete failed: no sub-response for item");
                    SubOutcome::fatal(None, "missing sub-response")
                })
            })
            .collect();

        Ok(DecodedBatch {
            outcomes,
            retry_after,
        })
    }

    /// Whole call answered with a non-2xx status: every item shares it.
    fn decode_outer_failure(&self, items: &[WorkItem], response: &TransportResponse) -> DecodedBatch {
        let status = response.status;

        if is_retryable_status(status) {
            debug!(status, items = items.len(), "Batch call throttled as a whole");
            return DecodedBatch {
                outcomes: vec![
                    SubOutcome::Transient {
                        status,
                        retry_after: response.retry_after,
                    };
                    items.len()
                ],
                retry_after: response.retry_after,
            };
        }

        let body = snippet(&response.body);
        if status == 400 {
            warn!(status, body = %body, "Batch request rejected as malformed");
        } else {
            warn!(status, body = %body, items = items.len(), "Batch request rejected");
        }

        DecodedBatch {
            outcomes: vec![
                SubOutcome::fatal(Some(status), format!("batch rejected: {}", body));
                items.len()
            ],
            retry_after: None,
        }
    }

    /// Map a sub-response to its item position. Responses carry the 1-based
    /// id of their sub-request and may come back in any order; a response
    /// without an id falls back to its position in the array.
    fn position_of(&self, sub: &SubResponse, index: usize, len: usize) -> Option<usize> {
        let position = match &sub.id {
            Some(id) => match id.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => {
                    warn!(sub_id = %id, "Sub-response with unknown id ignored");
                    return None;
                }
            },
            None => index,
        };

        if position >= len {
            warn!(sub_id = ?sub.id, index, "Sub-response out of range ignored");
            return None;
        }
        Some(position)
    }
}

/// Classify one sub-response status.
///
/// 404 means the item is already gone (for example a delete that succeeded
/// on a call whose response was lost), which is the state we want.
pub fn classify_status(
    status: u16,
    retry_after: Option<Duration>,
    body: Option<&serde_json::Value>,
) -> SubOutcome {
    match status {
        200..=299 | 404 => SubOutcome::Success,
        s if is_retryable_status(s) => SubOutcome::Transient {
            status: s,
            retry_after,
        },
        s => {
            let reason = body
                .map(|b| snippet(&b.to_string()))
                .unwrap_or_else(|| "no body".to_string());
            SubOutcome::fatal(Some(s), reason)
        }
    }
}

fn sub_retry_after(sub: &SubResponse) -> Option<Duration> {
    sub.headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
        .and_then(|(_, value)| match value {
            serde_json::Value::String(s) => parse_retry_after_value(s),
            serde_json::Value::Number(n) => n.as_u64().map(Duration::from_secs),
            _ => None,
        })
}

fn snippet(text: &str) -> String {
    if text.len() <= BODY_SNIPPET_LEN {
        return text.to_string();
    }
    let mut end = BODY_SNIPPET_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
