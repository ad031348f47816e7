//! Sync types and constants.

/// Default number of concurrent synchronization tasks.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Default capacity of the work channel between enumerator and dispatcher.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default capacity of the progress channel.
pub const DEFAULT_PROGRESS_CAPACITY: usize = 1024;

/// Options for a backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Maximum synchronization tasks in flight.
    pub workers: usize,
    /// Repositories buffered between enumeration and dispatch.
    pub queue_capacity: usize,
    /// Events buffered for the progress consumer.
    pub progress_capacity: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_CONCURRENCY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            progress_capacity: DEFAULT_PROGRESS_CAPACITY,
        }
    }
}

impl SyncOptions {
    /// Set the worker count. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

/// What the enumerator produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationSummary {
    /// Repositories sent to the work channel.
    pub sent: usize,
    /// Namespaces (or the organization list) that failed to list.
    pub errors: usize,
}

/// What the dispatcher did with the work it received.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Descriptors received from the work channel.
    pub received: usize,
    /// Mirrors created.
    pub cloned: usize,
    /// Mirrors updated.
    pub fetched: usize,
    /// Repositories that could not be mirrored.
    pub failed: usize,
    /// Repositories skipped because their path was already handled.
    pub duplicates: usize,
}

/// Result of a whole backup run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Repositories discovered.
    pub enumerated: usize,
    /// Mirrors created.
    pub cloned: usize,
    /// Mirrors updated.
    pub fetched: usize,
    /// Repositories that could not be mirrored.
    pub failed: usize,
    /// Repositories skipped as duplicates.
    pub duplicates: usize,
    /// Namespaces that could not be listed.
    pub enumeration_errors: usize,
    /// Progress events the consumer never saw.
    pub dropped_events: usize,
}

impl SyncSummary {
    pub fn from_parts(enumeration: EnumerationSummary, dispatch: DispatchSummary) -> Self {
        Self {
            enumerated: enumeration.sent,
            cloned: dispatch.cloned,
            fetched: dispatch.fetched,
            failed: dispatch.failed,
            duplicates: dispatch.duplicates,
            enumeration_errors: enumeration.errors,
            dropped_events: 0,
        }
    }

    /// Mirrors that are now up to date.
    #[inline]
    pub fn complete(&self) -> usize {
        self.cloned + self.fetched
    }

    /// Whether anything went wrong.
    pub fn has_errors(&self) -> bool {
        self.failed > 0 || self.enumeration_errors > 0
    }
}
