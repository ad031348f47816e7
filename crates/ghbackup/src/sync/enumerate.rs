//! Repository enumeration: user repositories, then every organization's.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, instrument};

use crate::platform::{self, Page, RepositoryDescriptor, RepositorySource, short_error_message};

use super::progress::{ProgressSender, SyncProgress};
use super::types::EnumerationSummary;

/// Namespace label used for the authenticated user's own repositories.
pub const USER_NAMESPACE: &str = "user";

/// Namespace label used when the organization list itself fails.
pub const ORGANIZATIONS_NAMESPACE: &str = "organizations";

/// How a single source was drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drained {
    /// Descriptors sent to the work channel.
    pub sent: usize,
    /// The receiver went away; nothing more should be enumerated.
    pub closed: bool,
}

/// Page through one source and forward every descriptor to `tx`.
///
/// Starts at page 1 and follows `next_page` until the source reports none.
/// An empty page does not end the walk on its own. An empty first page with
/// no successor emits [`SyncProgress::NoRepositories`].
pub async fn drain_source<F, Fut>(
    namespace: &str,
    mut fetch_page: F,
    tx: &mpsc::Sender<RepositoryDescriptor>,
    progress: &ProgressSender,
) -> platform::Result<Drained>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = platform::Result<Page<RepositoryDescriptor>>>,
{
    let mut drained = Drained::default();
    let mut page = 1u32;

    progress.emit(SyncProgress::FetchingRepos {
        namespace: namespace.to_string(),
    });

    loop {
        let Page { items, next_page } = fetch_page(page).await?;
        let count = items.len();

        if page == 1 && count == 0 && next_page.is_none() {
            progress.emit(SyncProgress::NoRepositories {
                namespace: namespace.to_string(),
            });
            return Ok(drained);
        }

        for repo in items {
            if tx.send(repo).await.is_err() {
                debug!(namespace, "work channel closed, stopping enumeration");
                drained.closed = true;
                return Ok(drained);
            }
            drained.sent += 1;
        }

        progress.emit(SyncProgress::FetchedPage {
            namespace: namespace.to_string(),
            page,
            count,
            total_so_far: drained.sent,
        });

        match next_page {
            Some(next) if next > page => page = next,
            _ => break,
        }
    }

    progress.emit(SyncProgress::FetchComplete {
        namespace: namespace.to_string(),
        total: drained.sent,
    });

    Ok(drained)
}

/// Send every repository reachable by the authenticated user to `tx`.
///
/// The user's own repositories go first, then each organization's. A
/// failure in one source is reported as [`SyncProgress::FetchError`] and
/// only skips that source. The channel closes when `tx` is dropped on
/// return.
#[instrument(skip_all)]
pub async fn enumerate_repositories<S>(
    source: &S,
    tx: mpsc::Sender<RepositoryDescriptor>,
    progress: &ProgressSender,
) -> EnumerationSummary
where
    S: RepositorySource + ?Sized,
{
    let mut summary = EnumerationSummary::default();

    let user = drain_source(
        USER_NAMESPACE,
        |page| source.list_user_repos(page),
        &tx,
        progress,
    )
    .await;
    if record(&mut summary, USER_NAMESPACE, user, progress) {
        return summary;
    }

    let orgs = match source.list_organizations().await {
        Ok(orgs) => orgs,
        Err(e) => {
            summary.errors += 1;
            progress.emit(SyncProgress::FetchError {
                namespace: ORGANIZATIONS_NAMESPACE.to_string(),
                error: short_error_message(&e),
            });
            return summary;
        }
    };
    debug!(count = orgs.len(), "listing organization repositories");

    for org in &orgs {
        let result = drain_source(
            org,
            |page| source.list_org_repos(org, page),
            &tx,
            progress,
        )
        .await;
        if record(&mut summary, org, result, progress) {
            break;
        }
    }

    summary
}

/// Fold one source's result into the summary. Returns `true` when the
/// receiver is gone.
fn record(
    summary: &mut EnumerationSummary,
    namespace: &str,
    result: platform::Result<Drained>,
    progress: &ProgressSender,
) -> bool {
    match result {
        Ok(drained) => {
            summary.sent += drained.sent;
            drained.closed
        }
        Err(e) => {
            summary.errors += 1;
            progress.emit(SyncProgress::FetchError {
                namespace: namespace.to_string(),
                error: short_error_message(&e),
            });
            false
        }
    }
}
