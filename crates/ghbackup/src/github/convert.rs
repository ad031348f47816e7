//! Conversion from GitHub API types to platform types.

use crate::platform::{RepositoryDescriptor, RepositoryOwner};

use super::types::GitHubRepository;

/// Convert a repository listed among the authenticated user's own.
///
/// The owner login comes from the `owner` object, falling back to the
/// prefix of `full_name` for trimmed-down payloads.
pub fn to_user_descriptor(repo: &GitHubRepository) -> RepositoryDescriptor {
    let login = repo
        .owner
        .as_ref()
        .map(|o| o.login.clone())
        .or_else(|| {
            repo.full_name
                .as_deref()
                .and_then(|full| full.split_once('/'))
                .map(|(owner, _)| owner.to_string())
        })
        .unwrap_or_default();

    to_descriptor(repo, RepositoryOwner::User(login))
}

/// Convert a repository listed under an organization.
pub fn to_org_descriptor(repo: &GitHubRepository, org: &str) -> RepositoryDescriptor {
    to_descriptor(repo, RepositoryOwner::Organization(org.to_string()))
}

/// Build a descriptor. A missing clone URL becomes an empty string, which
/// fails path derivation and is reported against that repository alone.
fn to_descriptor(repo: &GitHubRepository, owner: RepositoryOwner) -> RepositoryDescriptor {
    RepositoryDescriptor {
        name: repo.name.clone(),
        clone_url: repo.clone_url.clone().unwrap_or_default(),
        owner,
    }
}
