//! The immutable context every synchronization task runs with.
//!
//! # Example
//!
//! ```ignore
//! use ghbackup::sync::SyncContext;
//!
//! let ctx = SyncContext::builder()
//!     .backup_root("/srv/backup")
//!     .credentials(Arc::new(session))
//!     .build()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::mirror::{Anonymous, CredentialProvider, GitCli, VersionControl};

/// Error type for sync context construction.
#[derive(Debug, thiserror::Error)]
pub enum SyncContextError {
    /// Missing required field in builder.
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}

/// Result type for sync context operations.
pub type Result<T> = std::result::Result<T, SyncContextError>;

/// Builder for creating a [`SyncContext`].
#[derive(Default)]
pub struct SyncContextBuilder {
    backup_root: Option<PathBuf>,
    vcs: Option<Arc<dyn VersionControl>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
}

impl SyncContextBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory mirrors are stored under.
    pub fn backup_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.backup_root = Some(root.into());
        self
    }

    /// Set the version-control backend. Defaults to [`GitCli`].
    pub fn vcs(mut self, vcs: Arc<dyn VersionControl>) -> Self {
        self.vcs = Some(vcs);
        self
    }

    /// Set the credential provider. Defaults to [`Anonymous`].
    pub fn credentials(mut self, credentials: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build the sync context.
    ///
    /// # Errors
    ///
    /// Returns `SyncContextError::MissingField` if no backup root was set.
    pub fn build(self) -> Result<SyncContext> {
        let backup_root = self.backup_root.ok_or(SyncContextError::MissingField {
            field: "backup_root",
        })?;

        Ok(SyncContext {
            backup_root,
            vcs: self.vcs.unwrap_or_else(|| Arc::new(GitCli::new())),
            credentials: self.credentials.unwrap_or_else(|| Arc::new(Anonymous)),
        })
    }
}

/// Where mirrors live and how they are synchronized.
///
/// Built once before any task starts and shared behind an `Arc`.
#[derive(Clone)]
pub struct SyncContext {
    backup_root: PathBuf,
    vcs: Arc<dyn VersionControl>,
    credentials: Arc<dyn CredentialProvider>,
}

impl SyncContext {
    /// Create a builder.
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    pub fn new(
        backup_root: impl Into<PathBuf>,
        vcs: Arc<dyn VersionControl>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            backup_root: backup_root.into(),
            vcs,
            credentials,
        }
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn vcs(&self) -> &dyn VersionControl {
        self.vcs.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialProvider {
        self.credentials.as_ref()
    }
}

impl fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContext")
            .field("backup_root", &self.backup_root)
            .finish_non_exhaustive()
    }
}
