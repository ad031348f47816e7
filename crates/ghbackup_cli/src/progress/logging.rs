use ghbackup::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchingRepos { namespace } => {
                tracing::info!(namespace = %namespace, "Fetching repositories");
            }

            SyncProgress::FetchedPage {
                namespace,
                page,
                count,
                total_so_far,
            } => {
                tracing::debug!(namespace = %namespace, page, count, total_so_far, "Fetched page");
            }

            SyncProgress::FetchComplete { namespace, total } => {
                tracing::info!(namespace = %namespace, total, "Fetch complete");
            }

            SyncProgress::NoRepositories { namespace } => {
                tracing::info!(namespace = %namespace, "No repositories");
            }

            SyncProgress::FetchError { namespace, error } => {
                tracing::warn!(namespace = %namespace, error = %error, "Failed to list repositories");
            }

            SyncProgress::Checking { repo, path } => {
                tracing::info!(repo = %repo, path = %path.display(), "Checking mirror");
            }

            SyncProgress::Cloning { path } => {
                tracing::info!(path = %path.display(), "Cloning");
            }

            SyncProgress::Fetching { path } => {
                tracing::info!(path = %path.display(), "Fetching");
            }

            SyncProgress::Complete { repo, path, cloned } => {
                if cloned {
                    tracing::info!(repo = %repo, path = %path.display(), "Cloned");
                } else {
                    tracing::info!(repo = %repo, path = %path.display(), "Up to date");
                }
            }

            SyncProgress::MirrorError { repo, error } => {
                tracing::warn!(repo = %repo, error = %error, "Failed to mirror");
            }

            SyncProgress::Duplicate { repo, path } => {
                tracing::debug!(repo = %repo, path = %path.display(), "Already mirrored in this run");
            }

            SyncProgress::SyncComplete {
                cloned,
                fetched,
                failed,
            } => {
                tracing::info!(cloned, fetched, failed, "Sync complete");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
