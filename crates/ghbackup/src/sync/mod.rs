//! The backup pipeline.
//!
//! # Module Structure
//!
//! - [`types`] - Options, summaries and constants
//! - [`progress`] - Best-effort progress channel: `SyncProgress`, `ProgressSender`
//! - [`context`] - The immutable `SyncContext` shared by every task
//! - [`enumerate`] - Paginated discovery feeding the work channel
//! - [`dispatch`] - Bounded worker pool running one task per repository
//! - [`engine`] - `run_backup()`, wiring the above together
//!
//! # Example
//!
//! ```ignore
//! use ghbackup::sync::{SyncOptions, progress_channel, run_backup};
//!
//! let (progress, mut events) = progress_channel(1024);
//! let consumer = tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("{event:?}");
//!     }
//! });
//! let summary = run_backup(client, ctx, &SyncOptions::default(), progress).await;
//! consumer.await?;
//! ```

mod context;
mod dispatch;
mod engine;
mod enumerate;
mod progress;
mod types;

pub use context::{SyncContext, SyncContextBuilder, SyncContextError};

pub use types::{DispatchSummary, EnumerationSummary, SyncOptions, SyncSummary};

pub use types::{DEFAULT_CONCURRENCY, DEFAULT_PROGRESS_CAPACITY, DEFAULT_QUEUE_CAPACITY};

pub use progress::{ProgressSender, SyncProgress, default_progress_channel, progress_channel};

pub use dispatch::dispatch;
pub use engine::run_backup;
pub use enumerate::{
    Drained, ORGANIZATIONS_NAMESPACE, USER_NAMESPACE, drain_source, enumerate_repositories,
};
