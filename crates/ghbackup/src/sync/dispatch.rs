//! Dispatch of synchronization tasks onto a bounded worker pool.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, instrument};
use url::Url;

use crate::mirror::{MirrorOutcome, mirror_path_for, parse_remote, sync_mirror};
use crate::platform::RepositoryDescriptor;

use super::context::SyncContext;
use super::progress::{ProgressSender, SyncProgress};
use super::types::DispatchSummary;

/// Run one synchronization task per received repository, at most `workers`
/// at a time, until the channel closes and every task has finished.
///
/// Mirror paths are derived before spawning. A repository whose path was
/// already handled in this run is skipped, so no two tasks ever touch the
/// same directory. Emits [`SyncProgress::SyncComplete`] exactly once.
#[instrument(skip(rx, ctx, progress))]
pub async fn dispatch(
    mut rx: mpsc::Receiver<RepositoryDescriptor>,
    ctx: Arc<SyncContext>,
    workers: usize,
    progress: &ProgressSender,
) -> DispatchSummary {
    let workers = workers.max(1);
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks: JoinSet<Option<MirrorOutcome>> = JoinSet::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut summary = DispatchSummary::default();

    while let Some(repo) = rx.recv().await {
        summary.received += 1;
        let full_name = repo.full_name();

        let (remote, path) = match resolve(&ctx, &repo) {
            Ok(resolved) => resolved,
            Err(error) => {
                summary.failed += 1;
                progress.emit(SyncProgress::MirrorError {
                    repo: full_name,
                    error,
                });
                continue;
            }
        };

        if !seen.insert(path.clone()) {
            debug!(repo = %full_name, path = %path.display(), "skipping duplicate");
            summary.duplicates += 1;
            progress.emit(SyncProgress::Duplicate {
                repo: full_name,
                path,
            });
            continue;
        }

        while let Some(result) = tasks.try_join_next() {
            record(&mut summary, result, progress);
        }

        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                summary.failed += 1;
                progress.emit(SyncProgress::MirrorError {
                    repo: full_name,
                    error: "Semaphore closed unexpectedly".to_string(),
                });
                continue;
            }
        };

        let ctx = Arc::clone(&ctx);
        let progress = progress.clone();
        tasks.spawn(async move {
            let _permit = permit;
            run_task(&ctx, full_name, path, remote, &progress).await
        });
    }

    while let Some(result) = tasks.join_next().await {
        record(&mut summary, result, progress);
    }

    progress.emit(SyncProgress::SyncComplete {
        cloned: summary.cloned,
        fetched: summary.fetched,
        failed: summary.failed,
    });

    summary
}

fn resolve(ctx: &SyncContext, repo: &RepositoryDescriptor) -> Result<(Url, PathBuf), String> {
    let remote = parse_remote(&repo.clone_url).map_err(|e| e.to_string())?;
    let path = mirror_path_for(ctx.backup_root(), &remote).map_err(|e| e.to_string())?;
    Ok((remote, path))
}

/// One repository's lifecycle: checking, then cloning or fetching, then
/// complete or failed.
async fn run_task(
    ctx: &SyncContext,
    repo: String,
    path: PathBuf,
    remote: Url,
    progress: &ProgressSender,
) -> Option<MirrorOutcome> {
    progress.emit(SyncProgress::Checking {
        repo: repo.clone(),
        path: path.clone(),
    });

    match sync_mirror(ctx, &path, &remote, progress).await {
        Ok(outcome) => {
            progress.emit(SyncProgress::Complete {
                repo,
                path,
                cloned: outcome == MirrorOutcome::Cloned,
            });
            Some(outcome)
        }
        Err(e) => {
            progress.emit(SyncProgress::MirrorError {
                repo,
                error: e.to_string(),
            });
            None
        }
    }
}

fn record(
    summary: &mut DispatchSummary,
    result: Result<Option<MirrorOutcome>, JoinError>,
    progress: &ProgressSender,
) {
    match result {
        Ok(Some(MirrorOutcome::Cloned)) => summary.cloned += 1,
        Ok(Some(MirrorOutcome::Fetched)) => summary.fetched += 1,
        Ok(None) => summary.failed += 1,
        Err(e) => {
            summary.failed += 1;
            progress.emit(SyncProgress::Warning {
                message: format!("Task panic: {}", e),
            });
        }
    }
}
