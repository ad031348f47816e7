use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;
use url::Url;

use super::error::{MirrorError, Result};
use crate::sync::{ProgressSender, SyncContext, SyncProgress};

/// What [`sync_mirror`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// A new mirror was created.
    Cloned,
    /// An existing mirror was updated.
    Fetched,
}

/// Create the mirror at `path` if it is absent, otherwise update it.
///
/// Calling this again after success is safe: the second call takes the
/// fetch path. A failed clone leaves whatever git left behind; the next run
/// will see a directory and try to fetch into it.
pub async fn sync_mirror(
    ctx: &SyncContext,
    path: &Path,
    remote: &Url,
    progress: &ProgressSender,
) -> Result<MirrorOutcome> {
    match tokio::fs::metadata(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|source| MirrorError::CreateDir {
                    path: path.to_path_buf(),
                    source,
                })?;

            progress.emit(SyncProgress::Cloning {
                path: path.to_path_buf(),
            });
            debug!(path = %path.display(), remote = %remote, "cloning mirror");

            let creds = ctx.credentials().credentials(remote);
            ctx.vcs().clone_mirror(remote, path, creds.as_ref()).await?;
            Ok(MirrorOutcome::Cloned)
        }
        Err(source) => Err(MirrorError::Inspect {
            path: path.to_path_buf(),
            source,
        }),
        Ok(meta) if meta.is_dir() => {
            progress.emit(SyncProgress::Fetching {
                path: path.to_path_buf(),
            });
            debug!(path = %path.display(), "fetching mirror");

            let creds = ctx.credentials().credentials(remote);
            ctx.vcs().fetch_prune(path, creds.as_ref()).await?;
            Ok(MirrorOutcome::Fetched)
        }
        Ok(_) => Err(MirrorError::NotADirectory {
            path: path.to_path_buf(),
        }),
    }
}
