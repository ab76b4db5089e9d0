//! mailpurge - bulk mailbox cleanup over the Graph `$batch` endpoint
//!
//! Lists matching messages per sender, asks for confirmation, then hands the
//! ids to the wave scheduler.

#![allow(missing_docs)]

use anyhow::{Context, bail};
use clap::Parser;
use mailpurge_rs::cli::{self, Cli};
use mailpurge_rs::graph::{
    GraphItemSource, ItemSource, SAMPLE_FOLDER_COUNT, StaticTokenProvider, TokenProvider,
};
use mailpurge_rs::utils::logging::init_logging;
use mailpurge_rs::utils::net::create_client;
use mailpurge_rs::{
    CancellationToken, Config, DeleteMode, HttpBatchTransport, WaveScheduler, WorkItem,
    cancel_on_ctrl_c,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(args.log_level, args.log_format);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} keeps the context chain on one line
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&args).await?;
    debug!(?config, "Effective configuration");

    if args.test_auth {
        return test_auth(&args, &config).await;
    }

    let senders = cli::collect_senders(&args).await?;
    if senders.is_empty() && !args.unread {
        bail!(
            "Provide senders (--sender, --senders, --sender-file) or use --unread to target all unread messages"
        );
    }

    let tokens = Arc::new(StaticTokenProvider::resolve(args.access_token.clone())?);
    let cancel = CancellationToken::new();
    let _ctrl_c = cancel_on_ctrl_c(cancel.clone());

    let client = create_client(&config.http)?;
    let source = GraphItemSource::with_client(
        client.clone(),
        &config.graph,
        &config.http,
        tokens.clone(),
    );
    let folder = source.folder().to_string();

    let base_filter = args.base_filter();
    let mut matched: Vec<WorkItem> = Vec::new();
    if senders.is_empty() {
        let filter = base_filter.unread_only(true);
        let ids = source
            .list_pending_items(&filter, &cancel)
            .await
            .with_context(|| format!("listing unread messages in {}", folder))?;
        println!(
            "Found {} unread message(s) in {}{}",
            ids.len(),
            folder,
            if filter.preserve_attachments { " (attachments preserved)" } else { "" }
        );
        matched.extend(ids);
    } else {
        for sender in &senders {
            if cancel.is_cancelled() {
                break;
            }
            let filter = base_filter.clone().with_sender(sender.as_str());
            let ids = source
                .list_pending_items(&filter, &cancel)
                .await
                .with_context(|| format!("listing messages from {}", sender))?;
            println!(
                "Found {} message(s) from {} in {}{}",
                ids.len(),
                sender,
                folder,
                filter.describe()
            );
            matched.extend(ids);
        }
    }

    let items = cli::dedup_items(matched);
    let total = items.len();
    println!("Total messages matched: {}", total);

    if args.dry_run || total == 0 || cancel.is_cancelled() {
        return Ok(ExitCode::SUCCESS);
    }

    let mode = DeleteMode::from_hard_delete(config.engine.hard_delete);
    if !args.yes && total >= args.confirm_threshold {
        let prompt = cli::confirmation_prompt(total, &folder, mode);
        let proceed = tokio::task::spawn_blocking(move || cli::confirm(&prompt))
            .await
            .unwrap_or(false);
        if !proceed || cancel.is_cancelled() {
            println!("Aborted. No messages were deleted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let token = tokens.get_bearer_token().await?;
    let transport =
        HttpBatchTransport::with_client(client, &config.graph.base_url, token, &config.http);
    info!(endpoint = transport.endpoint(), items = total, "Deleting");

    let scheduler = WaveScheduler::new(Arc::new(transport), config.engine.clone(), cancel);
    let report = scheduler.run(items).await?;

    println!("{}", cli::format_summary(&report, mode));
    Ok(cli::exit_code(&report))
}

/// List a few folders with the configured token and report the outcome
async fn test_auth(args: &Cli, config: &Config) -> anyhow::Result<ExitCode> {
    let tokens = Arc::new(StaticTokenProvider::resolve(args.access_token.clone())?);
    let source = GraphItemSource::new(config, tokens)?;

    let folders = source
        .sample_folders(SAMPLE_FOLDER_COUNT, &CancellationToken::new())
        .await
        .context("token check failed")?;

    println!("Token accepted. Sample folders:");
    for folder in &folders {
        match folder.total_item_count {
            Some(count) => println!(" - {} (items: {})", folder.display_name, count),
            None => println!(" - {}", folder.display_name),
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// File (if any), then environment, then flags; normalized and validated
async fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let base = match &args.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    let config = args.apply_to(base.apply_env()?).normalize();
    config.validate()?;
    Ok(config)
}
