//! ghbackup CLI - mirror every GitHub repository you can reach.

mod config;
mod progress;
mod token_cache;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use ghbackup::github::GitHubClient;
use ghbackup::sync::{SyncContext, SyncOptions, progress_channel, run_backup};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::progress::ProgressReporter;
use crate::token_cache::TokenCacheError;

/// How often a dot is printed in quiet mode.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(2);

const DEFAULT_FILTER: &str = "ghbackup=warn,ghbackup_cli=warn";
const VERBOSE_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "ghbackup")]
#[command(version)]
#[command(about = "Mirror every GitHub repository you can reach")]
#[command(
    long_about = "ghbackup lists the repositories of the authenticated user and of every \
organization they belong to, and keeps a bare mirror of each one under a local \
directory. New repositories are cloned; existing mirrors are fetched and pruned."
)]
#[command(after_long_help = r#"EXAMPLES
    Back up into the current directory:
        $ ghbackup --token ghp_...

    Remember the token and back up somewhere else:
        $ ghbackup --token ghp_... --cache ~/.cache/ghbackup/token.json --to /srv/backup
        $ ghbackup --cache ~/.cache/ghbackup/token.json --to /srv/backup

    Back up from GitHub Enterprise with per-repository output:
        $ ghbackup --api-url https://github.example.com/api/v3 --to /srv/backup -v

CONFIGURATION
    ghbackup reads configuration from:
      1. ~/.config/ghbackup/config.toml (or $XDG_CONFIG_HOME/ghbackup/config.toml)
      2. ./ghbackup.toml
      3. Environment variables (GHBACKUP_* prefix, e.g., GHBACKUP_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GHBACKUP_GITHUB_TOKEN     GitHub personal access token
    GHBACKUP_BACKUP_ROOT      Backup directory (default: current directory)
    GHBACKUP_BACKUP_WORKERS   Maximum concurrent git operations (default: 20)
    GHBACKUP_API_URL          GitHub API base URL (default: https://api.github.com)
    GHBACKUP_CACHE            Token cache file
    RUST_LOG                  Log filter, overrides --verbose
"#)]
pub(crate) struct Cli {
    /// GitHub personal access token
    #[arg(long)]
    pub(crate) token: Option<String>,

    /// Token cache file; written when --token is also given
    #[arg(long, value_name = "FILE", env = "GHBACKUP_CACHE")]
    pub(crate) cache: Option<PathBuf>,

    /// Directory to store the mirrors in (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub(crate) to: Option<PathBuf>,

    /// Log every repository instead of printing a heartbeat
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Maximum concurrent git operations (default from config or 20)
    #[arg(long, value_name = "N")]
    pub(crate) workers: Option<usize>,

    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long, value_name = "URL", env = "GHBACKUP_API_URL")]
    pub(crate) api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load()?;
    let settings = Settings::resolve(&cli, config);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if settings.verbose => EnvFilter::new(VERBOSE_FILTER),
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let token = match token_cache::resolve_token(
        settings.token.as_deref(),
        settings.cache_file.as_deref(),
    ) {
        Ok(token) => token,
        Err(e @ TokenCacheError::Missing) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, e)
            .exit(),
        Err(e) => return Err(e.into()),
    };

    let client = Arc::new(GitHubClient::with_api_url(&token, &settings.api_url)?);
    let session = client.authenticate().await?;
    tracing::info!(user = %session.username(), "Authenticated");

    let ctx = SyncContext::builder()
        .backup_root(&settings.root)
        .credentials(Arc::new(session))
        .build()?;
    let options = SyncOptions::default().with_workers(settings.workers);

    let reporter = ProgressReporter::new(settings.verbose);
    let (progress, mut events) = progress_channel(options.progress_capacity);
    let mut backup =
        tokio::spawn(async move { run_backup(client, ctx, &options, progress).await });

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    // The first tick completes immediately.
    heartbeat.tick().await;

    let summary = loop {
        tokio::select! {
            Some(event) = events.recv() => reporter.handle(event),
            _ = heartbeat.tick() => reporter.tick(),
            result = &mut backup => break result?,
        }
    };

    while let Ok(event) = events.try_recv() {
        reporter.handle(event);
    }
    reporter.finish();

    if summary.dropped_events > 0 {
        tracing::debug!(dropped = summary.dropped_events, "Progress events dropped");
    }
    if summary.has_errors() {
        tracing::warn!(
            repositories = summary.enumerated,
            cloned = summary.cloned,
            fetched = summary.fetched,
            failed = summary.failed,
            enumeration_errors = summary.enumeration_errors,
            "Backup finished with errors"
        );
    } else {
        tracing::info!(
            repositories = summary.enumerated,
            cloned = summary.cloned,
            fetched = summary.fetched,
            duplicates = summary.duplicates,
            "Backup finished"
        );
    }

    Ok(())
}
