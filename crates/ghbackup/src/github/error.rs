//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Authentication required")]
    AuthRequired,

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GitHubError {
    /// Classify an octocrab error, pulling authentication failures out of
    /// the generic API bucket.
    pub fn from_octocrab(e: octocrab::Error) -> Self {
        if is_auth_error(&e) {
            Self::AuthRequired
        } else {
            Self::Api(e)
        }
    }
}

/// Check if an octocrab error is a rejected or missing credential.
pub fn is_auth_error(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => source.status_code.as_u16() == 401,
        _ => false,
    }
}

impl From<GitHubError> for PlatformError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { reset_at } => PlatformError::RateLimited { reset_at },
            GitHubError::AuthRequired => PlatformError::AuthRequired,
            GitHubError::Forbidden(resource) => PlatformError::forbidden(resource),
            GitHubError::NotFound(resource) => PlatformError::not_found(resource),
            GitHubError::Network(msg) => PlatformError::network(msg),
            GitHubError::Api(e) => PlatformError::api(e.to_string()),
            GitHubError::Internal(msg) => PlatformError::internal(msg),
        }
    }
}
