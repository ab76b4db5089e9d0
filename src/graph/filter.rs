//! OData `$filter` construction for message listing

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Which messages of a folder to select
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFilter {
    /// Sender address, compared exactly by the server
    pub sender: Option<String>,
    pub unread_only: bool,
    /// Skip messages that carry attachments
    pub preserve_attachments: bool,
    /// Received strictly before now minus N days
    pub older_than_days: Option<u32>,
    /// Received at or after now minus N days
    pub newer_than_days: Option<u32>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sender<S: Into<String>>(mut self, sender: S) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn unread_only(mut self, unread_only: bool) -> Self {
        self.unread_only = unread_only;
        self
    }

    pub fn preserve_attachments(mut self, preserve: bool) -> Self {
        self.preserve_attachments = preserve;
        self
    }

    pub fn older_than_days(mut self, days: Option<u32>) -> Self {
        self.older_than_days = days;
        self
    }

    pub fn newer_than_days(mut self, days: Option<u32>) -> Self {
        self.newer_than_days = days;
        self
    }

    /// Expression for the current time, or `None` when nothing is filtered
    pub fn to_odata(&self) -> Option<String> {
        self.to_odata_at(Utc::now())
    }

    /// Expression with date cutoffs relative to `now`.
    ///
    /// String literals are single-quoted; date literals are not.
    pub fn to_odata_at(&self, now: DateTime<Utc>) -> Option<String> {
        let mut parts = Vec::new();

        if let Some(sender) = &self.sender {
            parts.push(format!(
                "from/emailAddress/address eq '{}'",
                sender.replace('\'', "''")
            ));
        }
        if self.unread_only {
            parts.push("isRead eq false".to_string());
        }
        if self.preserve_attachments {
            parts.push("hasAttachments eq false".to_string());
        }
        if let Some(days) = self.older_than_days {
            let cutoff = now - Duration::days(i64::from(days));
            parts.push(format!("receivedDateTime lt {}", odata_datetime(cutoff)));
        }
        if let Some(days) = self.newer_than_days {
            let cutoff = now - Duration::days(i64::from(days));
            parts.push(format!("receivedDateTime ge {}", odata_datetime(cutoff)));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" and "))
        }
    }

    /// Short human description used in listing summaries
    pub fn describe(&self) -> String {
        let mut notes = Vec::new();
        if self.unread_only {
            notes.push("unread only");
        }
        if self.preserve_attachments {
            notes.push("attachments preserved");
        }
        if notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", notes.join(", "))
        }
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ`, whole seconds, UTC
pub fn odata_datetime(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
