//! `boardsync` entry point.
//!
//! ## Commands
//!
//! - `boardsync run [--dry-run]` — one reconciliation pass
//! - `boardsync pitch-status` — render and publish the pitch summary
//!
//! Configuration comes from a TOML file (default `boardsync.toml`) with
//! `BOARDSYNC_*` environment overrides; the API token comes from
//! `GITHUB_TOKEN` only.

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};

use boardsync_core::api::DryRunApi;
use boardsync_core::{SecretToken, SyncConfig, pitch, sync_board};
use boardsync_github::GithubClient;

#[derive(Debug, Parser)]
#[command(name = "boardsync", about = "Reconcile a project board with its issue trackers")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "boardsync.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one reconciliation pass over the configured board.
    Run {
        /// Plan and log mutations without issuing them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Scan the pitch board and rewrite the status note.
    PitchStatus,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = SyncConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let token = SecretToken::from_env()?;
    let client = GithubClient::new(cfg.owner.clone(), cfg.account_kind, token);

    match cli.command {
        Command::Run { dry_run } => {
            let report = if dry_run {
                tracing::info!("dry run: no mutations will be issued");
                sync_board(&DryRunApi::new(client), &cfg, Utc::now()).await?
            } else {
                sync_board(&client, &cfg, Utc::now()).await?
            };
            println!(
                "examined {} issues and {} pull requests: \
                 {} added, {} moved, {} removed, {} note moves, {} unchanged, {} failed",
                report.issues,
                report.pull_requests,
                report.added,
                report.moved,
                report.removed,
                report.note_moves,
                report.unchanged,
                report.failed,
            );
        }
        Command::PitchStatus => {
            let Some(pitch_cfg) = cfg.pitch.clone() else {
                bail!("pitch-status requires a [pitch] section in the config file");
            };
            let message = pitch::run_pitch_status(&client, &cfg, &pitch_cfg).await?;
            if message.is_empty() {
                println!("no active pitches");
            } else {
                println!("{message}");
            }
        }
    }

    Ok(())
}
