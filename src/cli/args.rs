//! Command-line arguments

use crate::config::Config;
use crate::graph::MessageFilter;
use crate::utils::logging::{LogFormat, LogLevel};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Version string including the commit the binary was built from
pub const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Bulk-delete mailbox messages through the Graph `$batch` endpoint
#[derive(Debug, Clone, Parser)]
#[command(name = "mailpurge", version = LONG_VERSION, about)]
pub struct Cli {
    /// Sender address; repeat for several
    #[arg(long = "sender", value_name = "EMAIL")]
    pub sender: Vec<String>,

    /// Comma-separated sender addresses
    #[arg(long, value_name = "LIST")]
    pub senders: Option<String>,

    /// File with one sender per line; `#` and `;` start comment lines
    #[arg(long, value_name = "PATH")]
    pub sender_file: Option<PathBuf>,

    /// Only unread messages. Without senders, targets all unread messages
    #[arg(long)]
    pub unread: bool,

    /// Only messages older than N days
    #[arg(long, value_name = "N")]
    pub older_than_days: Option<u32>,

    /// Only messages newer than N days
    #[arg(long, value_name = "N")]
    pub newer_than_days: Option<u32>,

    /// Leave messages that have attachments alone
    #[arg(long)]
    pub preserve_attachments: bool,

    /// Folder name: Inbox, DeletedItems, JunkEmail, Archive, or a custom one
    #[arg(long)]
    pub folder: Option<String>,

    /// Pre-acquired bearer token (else MAILPURGE_ACCESS_TOKEN / OUTLOOK_ACCESS_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    pub access_token: Option<String>,

    /// YAML configuration file
    #[arg(short, long, value_name = "PATH", env = "MAILPURGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Messages per listing page (max 100)
    #[arg(long, value_name = "N")]
    pub page_top: Option<usize>,

    /// Deletes per batch call (max 20)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Parallel batch calls
    #[arg(long, value_name = "N")]
    pub max_workers: Option<usize>,

    /// Permanently delete instead of moving to Deleted Items
    #[arg(long)]
    pub hard_delete: bool,

    /// Shrink workers and batch size while throttled
    #[arg(long)]
    pub adaptive_throttle: bool,

    /// Lower bound for workers when adapting
    #[arg(long, value_name = "N")]
    pub min_workers: Option<usize>,

    /// Lower bound for batch size when adapting
    #[arg(long, value_name = "N")]
    pub min_batch_size: Option<usize>,

    /// Pause between batch submissions, in milliseconds
    #[arg(long, value_name = "MS")]
    pub submit_sleep_ms: Option<u64>,

    /// Retry waves after the first pass
    #[arg(long, value_name = "N")]
    pub max_retry_waves: Option<u32>,

    /// Base wait between waves, in seconds
    #[arg(long, value_name = "SECS")]
    pub retry_base_wait: Option<f64>,

    /// HTTP timeout per request, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_seconds: Option<u64>,

    /// Only count matches; delete nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Check the access token by listing a few mail folders, then exit
    #[arg(long)]
    pub test_auth: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Ask before deleting at least this many messages
    #[arg(long, value_name = "N", default_value_t = 500)]
    pub confirm_threshold: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format (pretty, json)
    #[arg(long, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Overlay the flags that were given on top of `config`
    pub fn apply_to(&self, mut config: Config) -> Config {
        let engine = &mut config.engine;
        if let Some(batch_size) = self.batch_size {
            engine.batch_size = batch_size;
        }
        if let Some(workers) = self.max_workers {
            engine.max_workers = workers;
        }
        if let Some(min_workers) = self.min_workers {
            engine.min_workers = min_workers;
        }
        if let Some(min_batch_size) = self.min_batch_size {
            engine.min_batch_size = min_batch_size;
        }
        if let Some(waves) = self.max_retry_waves {
            engine.max_waves = waves;
        }
        if let Some(secs) = self.retry_base_wait {
            if let Ok(base) = Duration::try_from_secs_f64(secs) {
                engine.base_backoff = base;
            }
        }
        if let Some(ms) = self.submit_sleep_ms {
            engine.submit_delay = Duration::from_millis(ms);
        }
        engine.hard_delete |= self.hard_delete;
        engine.adaptive_throttle |= self.adaptive_throttle;

        if let Some(secs) = self.timeout_seconds {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(folder) = &self.folder {
            config.graph.folder = folder.clone();
        }
        if let Some(page_top) = self.page_top {
            config.graph.page_size = page_top;
        }
        config
    }

    /// Filter shared by every sender query
    pub fn base_filter(&self) -> MessageFilter {
        MessageFilter::new()
            .unread_only(self.unread)
            .preserve_attachments(self.preserve_attachments)
            .older_than_days(self.older_than_days)
            .newer_than_days(self.newer_than_days)
    }
}
