use std::fmt;

use async_trait::async_trait;

use super::errors::Result;

/// Who a repository was discovered through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RepositoryOwner {
    /// Listed among the authenticated user's own repositories.
    User(String),
    /// Listed under an organization the user belongs to.
    Organization(String),
}

impl RepositoryOwner {
    /// The login of the owning account.
    pub fn login(&self) -> &str {
        match self {
            Self::User(login) | Self::Organization(login) => login,
        }
    }

    #[inline]
    pub fn is_organization(&self) -> bool {
        matches!(self, Self::Organization(_))
    }
}

impl fmt::Display for RepositoryOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(login) => write!(f, "user {login}"),
            Self::Organization(login) => write!(f, "org {login}"),
        }
    }
}

/// The minimal identity of a remote repository, as returned by enumeration.
///
/// The clone URL is authoritative for where the mirror lives on disk; the
/// name is only used for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Repository name.
    pub name: String,
    /// HTTPS clone URL.
    pub clone_url: String,
    /// The account the repository was listed under.
    pub owner: RepositoryOwner,
}

impl RepositoryDescriptor {
    pub fn new(
        name: impl Into<String>,
        clone_url: impl Into<String>,
        owner: RepositoryOwner,
    ) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            owner,
        }
    }

    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login(), self.name)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// The next page number, if the platform reported one.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page: Option<u32>) -> Self {
        Self { items, next_page }
    }

    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }
}

/// Information about the authenticated user.
#[derive(Debug, Clone)]
pub struct UserInfo {
    /// Username/login.
    pub username: String,
}

/// A source of repositories to back up.
///
/// Listing calls are page-oriented: the caller drives pagination with the
/// `next_page` indicator of each returned [`Page`], so that it can tell an
/// empty collection apart from an exhausted one.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// List one page of the authenticated user's repositories.
    async fn list_user_repos(&self, page: u32) -> Result<Page<RepositoryDescriptor>>;

    /// List the logins of every organization the authenticated user belongs to.
    async fn list_organizations(&self) -> Result<Vec<String>>;

    /// List one page of an organization's repositories, of every type.
    async fn list_org_repos(&self, org: &str, page: u32) -> Result<Page<RepositoryDescriptor>>;
}
