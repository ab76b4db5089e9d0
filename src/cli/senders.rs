//! Sender selection from flags and files

use super::args::Cli;
use crate::core::batch::WorkItem;
use crate::utils::error::{PurgeError, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Non-empty, non-comment lines of a sender list
pub fn parse_sender_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with(';'))
        .map(str::to_string)
        .collect()
}

/// Read a sender list file
pub async fn load_sender_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        PurgeError::config(format!("Sender file {} unreadable: {}", path.display(), e))
    })?;
    Ok(parse_sender_lines(&content))
}

/// Every sender named on the command line, sorted and de-duplicated
pub async fn collect_senders(cli: &Cli) -> Result<BTreeSet<String>> {
    let mut senders: BTreeSet<String> = cli
        .sender
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(list) = &cli.senders {
        senders.extend(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }

    if let Some(path) = &cli.sender_file {
        senders.extend(load_sender_list(path).await?);
    }

    Ok(senders)
}

/// Drop repeated ids, keeping the first occurrence
pub fn dedup_items(items: Vec<WorkItem>) -> Vec<WorkItem> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
