use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors scoped to a single repository's mirror.
///
/// None of these abort the run; the dispatcher reports them and moves on.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid repository URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("repository URL `{url}` has no host")]
    MissingHost { url: String },

    #[error("repository URL `{url}` has no path")]
    MissingPath { url: String },

    #[error("repository URL `{url}` contains unsafe path segment `{segment}`")]
    UnsafeSegment { url: String, segment: String },

    #[error("could not create `{}`", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` exists, but is a file", path.display())]
    NotADirectory { path: PathBuf },

    #[error("could not inspect `{}`", path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} of `{}` failed ({status}): {stderr}", path.display())]
    Git {
        operation: &'static str,
        path: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
}

impl MirrorError {
    /// Whether the failure came from git itself rather than local setup.
    pub fn is_git_failure(&self) -> bool {
        matches!(self, Self::Git { .. } | Self::Spawn { .. })
    }
}

pub type Result<T> = std::result::Result<T, MirrorError>;
