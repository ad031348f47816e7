//! GitHub API data types.
//!
//! Only the handful of fields the backup needs are modelled; everything else
//! in the response bodies is ignored.

use serde::Deserialize;

/// Base URL of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size requested from every listing endpoint (GitHub's maximum).
pub const PER_PAGE: u32 = 100;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("ghbackup/", env!("CARGO_PKG_VERSION"));

/// A repository as returned by the listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    /// Repository name.
    pub name: String,
    /// `owner/name`.
    #[serde(default)]
    pub full_name: Option<String>,
    /// HTTPS clone URL.
    #[serde(default)]
    pub clone_url: Option<String>,
    /// The owning account.
    #[serde(default)]
    pub owner: Option<GitHubAccount>,
}

/// A user or organization account reference.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAccount {
    pub login: String,
}

/// An entry of `GET /user/orgs`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOrganization {
    pub login: String,
}

/// The subset of `GET /user` the backup needs.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}
