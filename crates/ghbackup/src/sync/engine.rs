//! The backup driver: enumeration feeding dispatch.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::platform::RepositorySource;

use super::context::SyncContext;
use super::dispatch::dispatch;
use super::enumerate::enumerate_repositories;
use super::progress::{ProgressSender, SyncProgress};
use super::types::{EnumerationSummary, SyncOptions, SyncSummary};

/// Discover every reachable repository and bring its mirror up to date.
///
/// The enumerator runs as its own task, feeding a bounded work channel that
/// the dispatcher drains on the current task. The returned future resolves
/// once the channel has closed and every synchronization task has returned.
///
/// Per-repository and per-namespace failures are reported through
/// `progress` and counted in the summary; they never end the run early.
///
/// # Example
///
/// ```ignore
/// use ghbackup::github::GitHubClient;
/// use ghbackup::sync::{SyncContext, SyncOptions, progress_channel, run_backup};
///
/// let client = Arc::new(GitHubClient::new(&token)?);
/// let session = client.authenticate().await?;
/// let ctx = SyncContext::builder()
///     .backup_root("/srv/backup")
///     .credentials(Arc::new(session))
///     .build()?;
/// let (progress, rx) = progress_channel(1024);
/// let summary = run_backup(client, ctx, &SyncOptions::default(), progress).await;
/// ```
#[instrument(skip_all, fields(workers = options.workers))]
pub async fn run_backup<S>(
    source: Arc<S>,
    ctx: SyncContext,
    options: &SyncOptions,
    progress: ProgressSender,
) -> SyncSummary
where
    S: RepositorySource + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));

    let enumerator = {
        let progress = progress.clone();
        tokio::spawn(async move { enumerate_repositories(source.as_ref(), tx, &progress).await })
    };

    let dispatched = dispatch(rx, Arc::new(ctx), options.workers, &progress).await;

    let enumeration = match enumerator.await {
        Ok(summary) => summary,
        Err(e) => {
            progress.emit(SyncProgress::Warning {
                message: format!("Task panic: {}", e),
            });
            EnumerationSummary {
                sent: dispatched.received,
                errors: 1,
            }
        }
    };

    let mut summary = SyncSummary::from_parts(enumeration, dispatched);
    summary.dropped_events = progress.dropped();

    info!(
        enumerated = summary.enumerated,
        cloned = summary.cloned,
        fetched = summary.fetched,
        failed = summary.failed,
        "backup finished"
    );

    summary
}
