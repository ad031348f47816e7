//! ghbackup - mirror every GitHub repository you can reach.
//!
//! This library discovers the authenticated user's own repositories and
//! those of every organization they belong to, then keeps a bare mirror of
//! each one under a local backup root.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use ghbackup::github::GitHubClient;
//! use ghbackup::sync::{SyncContext, SyncOptions, progress_channel, run_backup};
//!
//! let client = Arc::new(GitHubClient::new(&token)?);
//! let session = client.authenticate().await?;
//!
//! let ctx = SyncContext::builder()
//!     .backup_root("/srv/backup")
//!     .credentials(Arc::new(session))
//!     .build()?;
//!
//! let (progress, _events) = progress_channel(1024);
//! let summary = run_backup(client, ctx, &SyncOptions::default(), progress).await;
//! println!("{} mirrors up to date", summary.complete());
//! ```

pub mod github;
pub mod mirror;
pub mod platform;
pub mod session;
pub mod sync;

pub use github::{GitHubClient, GitHubError};
pub use mirror::{MirrorError, MirrorOutcome};
pub use platform::{PlatformError, RepositoryDescriptor, RepositoryOwner, RepositorySource};
pub use session::Session;
pub use sync::{SyncContext, SyncOptions, SyncProgress, SyncSummary, run_backup};
