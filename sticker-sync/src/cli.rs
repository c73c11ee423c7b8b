///
/// This module implements the CLI interface for sticker-sync: argument parsing, wiring the
/// concrete clients to the core pipeline, and user-visible output.
///
/// All pipeline logic lives in [`sticker-sync-core`]. Running the binary without arguments
/// performs one synchronisation with settings from the environment.
///
/// ## How To Use
/// - Command line: `sticker-sync`, `sticker-sync --config sync.yaml`, `sticker-sync --dry-run`.
/// - Programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`sticker-sync-core`]: ../../sticker-sync-core/
use crate::load_config::{load_config, load_config_from_env, CliConfig};
use crate::notion::NotionClient;
use crate::stickertrade::StickerTradeClient;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use sticker_sync_core::synchronise::{synchronise, SynchroniseReport};

/// Publish stickers from a Notion database to a stickertrade profile.
#[derive(Parser, Debug, Default)]
#[clap(
    name = "sticker-sync",
    version,
    about = "Publish stickers from a Notion database to a stickertrade profile"
)]
pub struct Cli {
    /// Path to a YAML config file; settings come from the environment when omitted
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Validate everything but upload nothing
    #[clap(long)]
    pub dry_run: bool,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_config_from_env()?,
    };
    let report = run_with_config(&config, cli.dry_run).await?;
    print_report(&report);
    Ok(())
}

/// Builds the clients for `config` and performs one synchronisation.
pub async fn run_with_config(config: &CliConfig, dry_run: bool) -> Result<SynchroniseReport> {
    let sync_config = config.sync_config(dry_run);
    sync_config.trace_loaded();

    let source = NotionClient::new_from_env(&config.source.api_base_url)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to construct Notion client")?;
    let destination = if dry_run {
        StickerTradeClient::new(config.destination.base_url.clone(), None)
    } else {
        StickerTradeClient::new_from_env(&config.destination.base_url)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("Failed to construct stickertrade client")?
    };

    tracing::info!(command = "sync", "Starting synchronisation process");
    match synchronise(&sync_config, &source, &destination, &destination).await {
        Ok(report) => {
            tracing::info!(
                command = "sync",
                uploaded = report.uploaded.len(),
                "Synchronisation complete"
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!(command = "sync", error = %e, "Synchronisation failed");
            Err(anyhow::Error::new(e).context("Synchronisation failed"))
        }
    }
}

fn print_report(report: &SynchroniseReport) {
    use sticker_sync_core::validate::SkipReason;

    println!("Synchronise complete.");
    println!("  already on stickertrade: {}", report.already_published);
    println!("  records scanned:         {}", report.scanned);
    println!(
        "  skipped:                 {} (already synced {}, none remaining {}, excluded {})",
        report.skipped.len(),
        report.skipped_for(SkipReason::AlreadySynced),
        report.skipped_for(SkipReason::NoneRemaining),
        report.skipped_for(SkipReason::Excluded),
    );
    if report.dry_run {
        println!("  would upload:            {}", report.accepted.len());
        for record in &report.accepted {
            println!("    - {} ({} remaining)", record.name, record.remaining_count);
        }
    } else {
        println!("  uploaded:                {}", report.uploaded.len());
        for sticker in &report.uploaded {
            println!("    - {} ({})", sticker.name, sticker.filename);
        }
    }
}
