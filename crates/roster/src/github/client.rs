//! GitHub API client: one authenticated (or anonymous) session.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::error::{GitHubError, is_rate_limit_error};
use super::rate_limit::ApiRateLimiter;
use super::types::{ApiRepository, RateLimitHeaders, RateLimitTier};
use crate::http::{HttpRequest, HttpTransport};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default `User-Agent` product identifier.
pub const DEFAULT_USER_AGENT: &str = "roster";

/// Media type requested from GitHub.
pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

/// Query parameters for a request, in the order they are appended.
pub type Query = Vec<(&'static str, String)>;

/// One page of a list endpoint.
#[derive(Debug)]
pub struct Page<T> {
    /// Decoded items of this page.
    pub items: Vec<T>,
    /// Whether another page may be requested.
    pub should_continue: bool,
}

impl<T> Page<T> {
    /// A page that ends pagination without items.
    pub fn exhausted() -> Self {
        Self {
            items: Vec::new(),
            should_continue: false,
        }
    }
}

/// A GitHub REST session.
///
/// The session owns the request headers (including the token) and the
/// optional pacing limiter. The transport underneath is shared.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: Arc<str>,
    user_agent: Arc<str>,
    token: Option<Arc<str>>,
    rate_limiter: Option<ApiRateLimiter>,
}

impl GitHubClient {
    /// Create a session against `api_url`.
    ///
    /// Blank tokens are treated as absent.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_url: &str,
        user_agent: &str,
        token: Option<&str>,
    ) -> Self {
        Self {
            transport,
            api_url: Arc::from(api_url.trim_end_matches('/')),
            user_agent: Arc::from(user_agent),
            token: token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(Arc::from),
            rate_limiter: None,
        }
    }

    /// Attach a pacing limiter awaited before every request.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Option<ApiRateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Whether requests are sent with an `Authorization` header.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The rate-limit tier this session runs under.
    pub fn rate_limit_tier(&self) -> RateLimitTier {
        if self.has_token() {
            RateLimitTier::Authenticated
        } else {
            RateLimitTier::Anonymous
        }
    }

    /// Build the absolute URL for a route and its query parameters.
    pub fn url(&self, route: &str, query: &[(&'static str, String)]) -> String {
        let mut url = format!("{}{}", self.api_url, route);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    fn request(&self, route: &str, query: &[(&'static str, String)]) -> HttpRequest {
        let request = HttpRequest::get(self.url(route, query))
            .header("Accept", ACCEPT_HEADER)
            .header("User-Agent", &*self.user_agent);
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }

    /// GET a route and decode a 200 body as `T`.
    ///
    /// A 403 is reported as [`GitHubError::RateLimited`] with whatever rate
    /// limit headers came back; any other non-200 is [`GitHubError::Status`].
    /// Single attempt, no retries.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, GitHubError> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let response = self.transport.get(self.request(route, query)).await?;

        match response.status {
            200 => serde_json::from_slice(&response.body)
                .map_err(|e| GitHubError::decode(route, e.to_string())),
            403 => {
                let info = RateLimitHeaders::from_headers(&response.headers);
                Err(GitHubError::RateLimited {
                    remaining: info.remaining,
                    reset_at: info.reset_at,
                })
            }
            status => Err(GitHubError::Status {
                status,
                route: route.to_string(),
            }),
        }
    }

    /// Fetch one page of a list endpoint.
    ///
    /// Expected failures (transport errors, non-200 statuses, rate limit
    /// exhaustion) are logged and end pagination with an empty page. Only a
    /// body that does not match the expected schema is returned as an error.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&'static str, String)],
    ) -> Result<Page<T>, GitHubError> {
        match self.get_json::<Vec<T>>(route, query).await {
            Ok(items) => {
                let should_continue = !items.is_empty();
                Ok(Page {
                    items,
                    should_continue,
                })
            }
            Err(GitHubError::RateLimited {
                remaining,
                reset_at,
            }) => {
                tracing::warn!(
                    route,
                    remaining = ?remaining,
                    reset_at = ?reset_at,
                    tier = %self.rate_limit_tier(),
                    "GitHub rate limit exhausted, stopping pagination"
                );
                Ok(Page::exhausted())
            }
            Err(e) if e.ends_pagination() => {
                tracing::warn!(route, error = %e, "Page fetch failed, stopping pagination");
                Ok(Page::exhausted())
            }
            Err(e) => Err(e),
        }
    }

    /// Look up a single repository by `owner/name`.
    ///
    /// Any failure except rate limiting is logged and yields `Ok(None)`: a
    /// failed detail lookup only drops that one record. An exhausted quota
    /// is returned as [`GitHubError::RateLimited`], since every further
    /// lookup would fail the same way.
    pub async fn get_repo(&self, full_name: &str) -> Result<Option<ApiRepository>, GitHubError> {
        let route = format!("/repos/{}", full_name);
        match self.get_json::<ApiRepository>(&route, &[]).await {
            Ok(repo) => Ok(Some(repo)),
            Err(e) if is_rate_limit_error(&e) => Err(e),
            Err(e) => {
                tracing::warn!(repo = full_name, error = %e, "Failed to fetch repository details");
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("tier", &self.rate_limit_tier())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::ApiOrganization;
    use crate::http::{HttpResponse, MockTransport, header_get};
    use serde_json::json;

    const API: &str = "https://api.test";

    fn client(transport: &MockTransport, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(Arc::new(transport.clone()), API, "roster-test", token)
    }

    #[test]
    fn test_url_appends_query_in_order() {
        let transport = MockTransport::new();
        let client = client(&transport, None);
        let url = client.url(
            "/users/octocat/repos",
            &[("type", "owner".to_string()), ("page", "2".to_string())],
        );
        assert_eq!(url, "https://api.test/users/octocat/repos?type=owner&page=2");
        assert_eq!(client.url("/user/orgs", &[]), "https://api.test/user/orgs");
    }

    #[test]
    fn test_trailing_slash_in_api_url_is_trimmed() {
        let transport = MockTransport::new();
        let client = GitHubClient::new(Arc::new(transport), "https://api.test/", "ua", None);
        assert_eq!(client.url("/user", &[]), "https://api.test/user");
    }

    #[test]
    fn test_blank_token_is_anonymous() {
        let transport = MockTransport::new();
        assert_eq!(
            client(&transport, Some("  ")).rate_limit_tier(),
            RateLimitTier::Anonymous
        );
        assert_eq!(
            client(&transport, Some("ghp_x")).rate_limit_tier(),
            RateLimitTier::Authenticated
        );
    }

    #[tokio::test]
    async fn test_request_headers_with_token() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/user/orgs"), json!([{ "login": "rust-lang" }]));

        let orgs: Vec<ApiOrganization> = client(&transport, Some("secret"))
            .get_json("/user/orgs", &[])
            .await
            .expect("orgs decode");
        assert_eq!(orgs[0].login, "rust-lang");

        let requests = transport.requests();
        let headers = &requests[0].headers;
        assert_eq!(header_get(headers, "accept"), Some(ACCEPT_HEADER));
        assert_eq!(header_get(headers, "user-agent"), Some("roster-test"));
        assert_eq!(header_get(headers, "authorization"), Some("token secret"));
    }

    #[tokio::test]
    async fn test_request_headers_without_token() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/user/orgs"), json!([]));

        let _: Vec<ApiOrganization> = client(&transport, None)
            .get_json("/user/orgs", &[])
            .await
            .expect("empty list decodes");
        let requests = transport.requests();
        assert_eq!(header_get(&requests[0].headers, "authorization"), None);
    }

    #[tokio::test]
    async fn test_fetch_page_non_empty_continues() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/user/orgs"), json!([{ "login": "a" }]));

        let page: Page<ApiOrganization> = client(&transport, None)
            .fetch_page("/user/orgs", &[])
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.should_continue);
    }

    #[tokio::test]
    async fn test_fetch_page_empty_stops() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/user/orgs"), json!([]));

        let page: Page<ApiOrganization> = client(&transport, None)
            .fetch_page("/user/orgs", &[])
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert!(!page.should_continue);
    }

    #[tokio::test]
    async fn test_fetch_page_rate_limited_stops_without_error() {
        let transport = MockTransport::new();
        transport.push_status(
            format!("{API}/user/orgs"),
            403,
            vec![
                ("x-ratelimit-remaining".to_string(), "0".to_string()),
                ("x-ratelimit-reset".to_string(), "1700000000".to_string()),
            ],
        );

        let page: Page<ApiOrganization> = client(&transport, None)
            .fetch_page("/user/orgs", &[])
            .await
            .expect("403 is not an error");
        assert!(page.items.is_empty());
        assert!(!page.should_continue);
    }

    #[tokio::test]
    async fn test_get_json_reports_rate_limit_headers() {
        let transport = MockTransport::new();
        transport.push_status(
            format!("{API}/user/orgs"),
            403,
            vec![("x-ratelimit-remaining".to_string(), "0".to_string())],
        );

        let err = client(&transport, None)
            .get_json::<Vec<ApiOrganization>>("/user/orgs", &[])
            .await
            .expect_err("403 should error at this layer");
        match err {
            GitHubError::RateLimited {
                remaining,
                reset_at,
            } => {
                assert_eq!(remaining, Some(0));
                assert!(reset_at.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_other_status_and_transport_failures_stop() {
        let transport = MockTransport::new();
        transport.push_status(format!("{API}/user/orgs"), 502, Vec::new());
        transport.push_transport_error(format!("{API}/user/orgs"), "connection refused");
        let client = client(&transport, None);

        for _ in 0..2 {
            let page: Page<ApiOrganization> = client.fetch_page("/user/orgs", &[]).await.unwrap();
            assert!(page.items.is_empty());
            assert!(!page.should_continue);
        }
    }

    #[tokio::test]
    async fn test_fetch_page_unexpected_shape_is_an_error() {
        let transport = MockTransport::new();
        transport.push_response(
            format!("{API}/user/orgs"),
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: br#"{"message":"not a list"}"#.to_vec(),
            },
        );

        let err = client(&transport, None)
            .fetch_page::<ApiOrganization>("/user/orgs", &[])
            .await
            .expect_err("object body should not decode as a list");
        assert!(matches!(err, GitHubError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_get_repo_returns_none_on_failure() {
        let transport = MockTransport::new();
        transport.push_status(format!("{API}/repos/octocat/gone"), 404, Vec::new());
        transport.push_transport_error(format!("{API}/repos/octocat/flaky"), "reset");

        let client = client(&transport, None);
        assert!(client.get_repo("octocat/gone").await.unwrap().is_none());
        assert!(client.get_repo("octocat/flaky").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_repo_surfaces_rate_limit() {
        let transport = MockTransport::new();
        transport.push_status(
            format!("{API}/repos/rust-lang/rust"),
            403,
            vec![("x-ratelimit-remaining".to_string(), "0".to_string())],
        );

        let err = client(&transport, None)
            .get_repo("rust-lang/rust")
            .await
            .expect_err("exhausted quota should be reported");
        assert!(is_rate_limit_error(&err));
    }
}
