//! Platform-agnostic view of a code hosting service.
//!
//! The sync pipeline only needs three listings from a platform: the user's
//! own repositories, the user's organizations, and each organization's
//! repositories. [`RepositorySource`] captures exactly that, so the
//! enumerator can be driven by the GitHub client in production and by an
//! in-memory source in tests.
//!
//! # Example
//!
//! ```ignore
//! use ghbackup::platform::{RepositorySource, Page};
//!
//! async fn first_page<S: RepositorySource>(source: &S) -> Result<(), PlatformError> {
//!     let Page { items, next_page } = source.list_user_repos(1).await?;
//!     for repo in items {
//!         println!("{} ({})", repo.full_name(), repo.clone_url);
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use types::{Page, RepositoryDescriptor, RepositoryOwner, RepositorySource, UserInfo};

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_platform_error_api() {
        let err = PlatformError::api("Something went wrong");
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("Something went wrong"));
    }

    #[test]
    fn test_platform_error_not_found() {
        let err = PlatformError::not_found("/orgs/acme/repos");
        assert!(err.to_string().contains("Not found"));
        assert!(err.to_string().contains("/orgs/acme/repos"));
    }

    #[test]
    fn test_platform_error_forbidden() {
        let err = PlatformError::forbidden("/orgs/acme/repos");
        assert_eq!(err.to_string(), "Forbidden: /orgs/acme/repos");
    }

    #[test]
    fn test_platform_error_rate_limited_display() {
        let rate_limited = PlatformError::RateLimited {
            reset_at: Utc::now(),
        };
        assert!(rate_limited.to_string().contains("Rate limit"));
    }

    #[test]
    fn test_platform_error_network_and_internal() {
        let err = PlatformError::network("connection refused");
        assert!(err.to_string().contains("Network error"));

        let err = PlatformError::internal("unexpected state");
        assert!(err.to_string().contains("Internal error"));
    }

    #[test]
    fn test_descriptor_full_name() {
        let repo = RepositoryDescriptor::new(
            "rust",
            "https://github.com/rust-lang/rust.git",
            RepositoryOwner::Organization("rust-lang".to_string()),
        );
        assert_eq!(repo.full_name(), "rust-lang/rust");
        assert!(repo.owner.is_organization());
    }

    #[test]
    fn test_repository_owner_display() {
        assert_eq!(
            RepositoryOwner::User("octocat".to_string()).to_string(),
            "user octocat"
        );
        assert_eq!(
            RepositoryOwner::Organization("github".to_string()).to_string(),
            "org github"
        );
        assert_eq!(RepositoryOwner::User("octocat".to_string()).login(), "octocat");
    }

    #[test]
    fn test_page_last_has_no_successor() {
        let page = Page::last(vec![1, 2, 3]);
        assert_eq!(page.items.len(), 3);
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_short_error_message_multiline() {
        let err = std::io::Error::other("first line\nsecond line\nthird line");
        assert_eq!(short_error_message(&err), "first line");
    }
}
