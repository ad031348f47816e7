//! GitHub API client for repository discovery.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Response payloads and API constants
//! - [`client`] - Client creation, `Link` pagination and the
//!   [`RepositorySource`](crate::platform::RepositorySource) implementation
//! - [`convert`] - Payload conversion to platform descriptors
//!
//! ```ignore
//! use ghbackup::github::GitHubClient;
//!
//! let client = GitHubClient::new(&token)?;
//! let session = client.authenticate().await?;
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use error::{GitHubError, is_auth_error};

pub use types::{DEFAULT_API_URL, GitHubOrganization, GitHubRepository, GitHubUser, PER_PAGE};

pub use client::{GitHubClient, LinkPagination, create_client, parse_link_header};

pub use convert::{to_org_descriptor, to_user_descriptor};
