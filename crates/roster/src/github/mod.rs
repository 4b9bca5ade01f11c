//! GitHub REST API access.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Response schemas and rate limit headers
//! - [`client`] - One authenticated or anonymous API session
//! - [`pagination`] - Endpoint configs and bounded page walking
//! - [`rate_limit`] - Proactive request pacing
//!
//! ```ignore
//! use roster::github::{GitHubClient, PaginatedFetchConfig, PageWalker};
//!
//! let client = GitHubClient::new(transport, DEFAULT_API_URL, "roster", token.as_deref());
//! let config = PaginatedFetchConfig::owned("octocat");
//! let mut walker = PageWalker::new(&client, &config);
//! while let Some(repos) = walker.next_page::<ApiRepository>().await? {
//!     // ...
//! }
//! ```

mod client;
mod error;
mod pagination;
mod rate_limit;
mod types;

pub use client::{ACCEPT_HEADER, DEFAULT_API_URL, DEFAULT_USER_AGENT, GitHubClient, Page, Query};
pub use error::{GitHubError, is_rate_limit_error};
pub use pagination::{DEFAULT_PER_PAGE, MAX_ORGANIZATIONS, PageWalker, PaginatedFetchConfig};
pub use rate_limit::{ApiRateLimiter, GITHUB_DEFAULT_RPS};
pub use types::{
    ApiEvent, ApiEventRepo, ApiOrganization, ApiOwner, ApiRepository, CONTRIBUTION_EVENT_TYPES,
    RateLimitHeaders, RateLimitTier,
};
