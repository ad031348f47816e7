//! Progress reporting for backup runs.
//!
//! Events flow from the enumerator and every synchronization task to a
//! single consumer over a bounded channel. Emission is best-effort: a full
//! or closed channel drops the event and bumps a counter, so a slow consumer
//! can never stall the pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;

use super::types::DEFAULT_PROGRESS_CAPACITY;

/// Progress events emitted during a backup run.
///
/// "namespace" is either the authenticated user or an organization login.
/// "repo" is the `owner/name` of a repository.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to list repositories for a namespace.
    FetchingRepos {
        /// The namespace being listed.
        namespace: String,
    },

    /// Fetched a page of repositories.
    FetchedPage {
        /// The namespace this page belongs to.
        namespace: String,
        /// Page number (1-indexed).
        page: u32,
        /// Number of repos on this page.
        count: usize,
        /// Running total of repos fetched so far.
        total_so_far: usize,
    },

    /// Finished listing a namespace.
    FetchComplete {
        /// The namespace that finished.
        namespace: String,
        /// Total number of repositories listed.
        total: usize,
    },

    /// The first page of a namespace was empty.
    NoRepositories {
        /// The namespace with nothing to back up.
        namespace: String,
    },

    /// Listing a namespace failed; its remaining pages are skipped.
    FetchError {
        /// The namespace that failed.
        namespace: String,
        /// Error message.
        error: String,
    },

    /// Inspecting the local mirror of a repository.
    Checking {
        /// Repository full name.
        repo: String,
        /// Local mirror path.
        path: PathBuf,
    },

    /// Creating a new mirror.
    Cloning {
        /// Local mirror path.
        path: PathBuf,
    },

    /// Updating an existing mirror.
    Fetching {
        /// Local mirror path.
        path: PathBuf,
    },

    /// A repository's mirror is up to date.
    Complete {
        /// Repository full name.
        repo: String,
        /// Local mirror path.
        path: PathBuf,
        /// Whether the mirror was freshly created.
        cloned: bool,
    },

    /// A repository could not be mirrored.
    MirrorError {
        /// Repository full name.
        repo: String,
        /// Error message.
        error: String,
    },

    /// A repository resolved to a path already handled in this run.
    Duplicate {
        /// Repository full name.
        repo: String,
        /// Local mirror path.
        path: PathBuf,
    },

    /// Every synchronization task has finished.
    SyncComplete {
        /// Mirrors created.
        cloned: usize,
        /// Mirrors updated.
        fetched: usize,
        /// Repositories that failed.
        failed: usize,
    },

    /// Warning message (non-fatal).
    Warning {
        /// Warning message.
        message: String,
    },
}

/// The producing half of the progress channel.
///
/// Cheap to clone; every clone shares the same drop counter.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<SyncProgress>>,
    dropped: Arc<AtomicUsize>,
}

impl ProgressSender {
    /// A sender that discards everything.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            dropped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Deliver an event without waiting.
    ///
    /// Returns `true` if the event was queued. A full channel, a closed
    /// receiver and a disabled sender all count the event as dropped.
    pub fn emit(&self, event: SyncProgress) -> bool {
        let delivered = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.try_send(event).is_ok());
        if !delivered {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        delivered
    }

    /// Number of events that could not be delivered.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for ProgressSender {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Create a bounded progress channel.
pub fn progress_channel(capacity: usize) -> (ProgressSender, mpsc::Receiver<SyncProgress>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let sender = ProgressSender {
        tx: Some(tx),
        dropped: Arc::new(AtomicUsize::new(0)),
    };
    (sender, rx)
}

/// [`progress_channel`] with the default capacity.
pub fn default_progress_channel() -> (ProgressSender, mpsc::Receiver<SyncProgress>) {
    progress_channel(DEFAULT_PROGRESS_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(n: usize) -> SyncProgress {
        SyncProgress::Warning {
            message: format!("w{n}"),
        }
    }

    #[tokio::test]
    async fn test_emit_delivers_in_order() {
        let (tx, mut rx) = progress_channel(8);

        assert!(tx.emit(warning(1)));
        assert!(tx.emit(warning(2)));
        drop(tx);

        let mut seen = Vec::new();
        while let Some(SyncProgress::Warning { message }) = rx.recv().await {
            seen.push(message);
        }
        assert_eq!(seen, vec!["w1", "w2"]);
    }

    #[test]
    fn test_full_channel_drops_without_blocking() {
        let (tx, _rx) = progress_channel(2);

        for n in 0..10 {
            tx.emit(warning(n));
        }

        assert_eq!(tx.dropped(), 8);
    }

    #[test]
    fn test_closed_receiver_drops() {
        let (tx, rx) = progress_channel(4);
        drop(rx);

        assert!(!tx.emit(warning(0)));
        assert_eq!(tx.dropped(), 1);
    }

    #[test]
    fn test_clones_share_drop_counter() {
        let (tx, rx) = progress_channel(1);
        drop(rx);
        let other = tx.clone();

        tx.emit(warning(0));
        other.emit(warning(1));
        assert_eq!(tx.dropped(), 2);
    }

    #[test]
    fn test_disabled_sender() {
        let tx = ProgressSender::disabled();
        assert!(!tx.emit(warning(0)));
        assert_eq!(tx.dropped(), 1);
    }

    #[test]
    fn test_sync_progress_debug() {
        let event = SyncProgress::MirrorError {
            repo: "rust-lang/rust".to_string(),
            error: "could not create `/backup`".to_string(),
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("MirrorError"));
        assert!(debug_str.contains("rust-lang/rust"));
    }
}
