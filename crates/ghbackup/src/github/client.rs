//! GitHub API client creation and paginated listing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap};
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::convert::{to_org_descriptor, to_user_descriptor};
use super::error::GitHubError;
use super::types::{
    DEFAULT_API_URL, GitHubOrganization, GitHubRepository, GitHubUser, PER_PAGE, USER_AGENT,
};
use crate::platform::{self, Page, RepositoryDescriptor, RepositorySource, UserInfo};
use crate::session::Session;

/// Pagination information extracted from GitHub's Link header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPagination {
    /// The next page number (from rel="next" link).
    pub next_page: Option<u32>,
}

/// Parse the Link header to extract pagination info.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/user/repos?per_page=100&page=2>; rel="next", <...&page=3>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
            {
                url = Some(inner);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some("next")) = (url, rel) {
            info.next_page = extract_page_from_url(url);
        }
    }

    info
}

/// Extract the page parameter from a URL.
fn extract_page_from_url(url: &str) -> Option<u32> {
    let (_, query) = url.split_once('?')?;

    query
        .split('&')
        .find_map(|param| param.strip_prefix("page="))
        .and_then(|value| value.parse().ok())
}

/// Read the rate limit reset time from response headers, if present.
fn rate_limit_reset(headers: &HeaderMap) -> DateTime<Utc> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .unwrap_or_else(Utc::now)
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}

/// Create an authenticated Octocrab instance for the given API base URL.
pub fn create_client(token: &str, api_url: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .base_uri(api_url)?
        .personal_token(token.to_string())
        .build()
        .map_err(GitHubError::Api)
}

/// GitHub API client implementing [`RepositorySource`].
///
/// Octocrab handles the authenticated-user lookup. Listing endpoints go
/// through a shared `reqwest` client so the `Link` header is available for
/// pagination.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
    token: Arc<String>,
    api_url: Arc<String>,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client for github.com.
    pub fn new(token: &str) -> Result<Self, GitHubError> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Create a client for a specific API base URL (GitHub Enterprise, tests).
    pub fn with_api_url(token: &str, api_url: &str) -> Result<Self, GitHubError> {
        let api_url = api_url.trim_end_matches('/');
        let client = create_client(token, api_url)?;
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GitHubError::Internal(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            inner: Arc::new(client),
            token: Arc::new(token.to_string()),
            api_url: Arc::new(api_url.to_string()),
            http_client,
        })
    }

    /// The API base URL this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// GET a JSON array route and return it as one [`Page`].
    ///
    /// The successor page number comes from the `Link` header; a response
    /// without one is the last page.
    #[instrument(skip(self), level = "debug")]
    pub async fn get_page<T: DeserializeOwned>(&self, route: &str) -> Result<Page<T>, GitHubError> {
        let url = format!("{}{}", self.api_url, route);

        let response = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(AUTHORIZATION, format!("Bearer {}", self.token.as_str()))
            .send()
            .await
            .map_err(|e| GitHubError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();

        match status {
            s if s.is_success() => {
                let next_page = headers
                    .get("link")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|h| parse_link_header(h).next_page);

                let items: Vec<T> = response
                    .json()
                    .await
                    .map_err(|e| GitHubError::Internal(format!("JSON parse error: {e}")))?;

                Ok(Page::new(items, next_page))
            }
            StatusCode::UNAUTHORIZED => Err(GitHubError::AuthRequired),
            StatusCode::TOO_MANY_REQUESTS => Err(GitHubError::RateLimited {
                reset_at: rate_limit_reset(&headers),
            }),
            StatusCode::FORBIDDEN if rate_limit_exhausted(&headers) => {
                Err(GitHubError::RateLimited {
                    reset_at: rate_limit_reset(&headers),
                })
            }
            StatusCode::FORBIDDEN => Err(GitHubError::Forbidden(route.to_string())),
            StatusCode::NOT_FOUND => Err(GitHubError::NotFound(route.to_string())),
            _ => Err(GitHubError::Internal(format!(
                "Unexpected HTTP status: {status}"
            ))),
        }
    }

    /// Look up the account the token belongs to.
    #[instrument(skip(self))]
    pub async fn get_authenticated_user(&self) -> Result<UserInfo, GitHubError> {
        let user: GitHubUser = self
            .inner
            .get("/user", None::<&()>)
            .await
            .map_err(GitHubError::from_octocrab)?;

        Ok(UserInfo {
            username: user.login,
        })
    }

    /// Validate the token and build the [`Session`] used for git credentials.
    pub async fn authenticate(&self) -> Result<Session, GitHubError> {
        let user = self.get_authenticated_user().await?;
        if user.username.is_empty() {
            return Err(GitHubError::Internal(
                "authenticated user has no login".to_string(),
            ));
        }
        Ok(Session::new(user.username, self.token.as_str()))
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_user_repos(&self, page: u32) -> platform::Result<Page<RepositoryDescriptor>> {
        let route = format!("/user/repos?per_page={PER_PAGE}&page={page}");
        let Page { items, next_page } = self.get_page::<GitHubRepository>(&route).await?;

        Ok(Page::new(
            items.iter().map(to_user_descriptor).collect(),
            next_page,
        ))
    }

    async fn list_organizations(&self) -> platform::Result<Vec<String>> {
        let mut orgs = Vec::new();
        let mut page = 1u32;

        loop {
            let route = format!("/user/orgs?per_page={PER_PAGE}&page={page}");
            let result = self.get_page::<GitHubOrganization>(&route).await?;
            orgs.extend(result.items.into_iter().map(|o| o.login));

            match result.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(orgs)
    }

    async fn list_org_repos(
        &self,
        org: &str,
        page: u32,
    ) -> platform::Result<Page<RepositoryDescriptor>> {
        let route = format!("/orgs/{org}/repos?type=all&per_page={PER_PAGE}&page={page}");
        let Page { items, next_page } = self.get_page::<GitHubRepository>(&route).await?;

        Ok(Page::new(
            items.iter().map(|r| to_org_descriptor(r, org)).collect(),
            next_page,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_github_client_is_repository_source() {
        fn assert_source<T: RepositorySource>() {}
        assert_source::<GitHubClient>();
    }

    #[test]
    fn test_parse_link_header_full() {
        let header = r#"<https://api.github.com/user/repos?per_page=100&page=2>; rel="next", <https://api.github.com/user/repos?per_page=100&page=3>; rel="last""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
    }

    #[test]
    fn test_parse_link_header_only_next() {
        let header = r#"<https://api.github.com/orgs/acme/repos?type=all&per_page=100&page=2>; rel="next""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, Some(2));
    }

    #[test]
    fn test_parse_link_header_last_page_has_prev_only() {
        let header = r#"<https://api.github.com/user/repos?per_page=100&page=1>; rel="first", <https://api.github.com/user/repos?per_page=100&page=2>; rel="prev""#;

        let info = parse_link_header(header);
        assert_eq!(info.next_page, None);
    }

    #[test]
    fn test_parse_link_header_last_without_next_ends_listing() {
        let header = r#"<https://api.github.com/user/repos?per_page=100&page=1>; rel="prev", <https://api.github.com/user/repos?per_page=100&page=5>; rel="last""#;

        assert_eq!(parse_link_header(header), LinkPagination::default());
    }

    #[test]
    fn test_parse_link_header_empty() {
        assert_eq!(parse_link_header(""), LinkPagination::default());
    }

    #[test]
    fn test_extract_page_from_url() {
        assert_eq!(
            extract_page_from_url("https://api.github.com/repos?page=5"),
            Some(5)
        );
        assert_eq!(
            extract_page_from_url("https://api.github.com/repos?per_page=100&page=3"),
            Some(3)
        );
        assert_eq!(
            extract_page_from_url("https://api.github.com/repos?per_page=100"),
            None
        );
        assert_eq!(extract_page_from_url("https://api.github.com/repos"), None);
    }

    #[test]
    fn test_rate_limit_headers() {
        let mut headers = HeaderMap::new();
        assert!(!rate_limit_exhausted(&headers));

        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        assert!(rate_limit_exhausted(&headers));
        assert_eq!(rate_limit_reset(&headers).timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_with_api_url_trims_trailing_slash() {
        let client = GitHubClient::with_api_url("t0ken", "https://ghe.example.com/api/v3/")
            .expect("client should build");
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
    }

    #[tokio::test]
    async fn test_debug_hides_token() {
        let client = GitHubClient::new("very-secret").expect("client should build");
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
