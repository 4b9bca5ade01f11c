//! GitHub API response schemas.
//!
//! Each endpoint the fetch pipeline consumes is modelled as an explicit
//! struct. Fields the pipeline does not read are ignored; fields it does
//! read are required unless GitHub documents them as nullable.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::http::HttpHeaders;
use crate::http::header_get;

/// Event types that count as a contribution to a repository.
pub const CONTRIBUTION_EVENT_TYPES: [&str; 4] =
    ["PushEvent", "PullRequestEvent", "IssuesEvent", "CreateEvent"];

/// Owner of a repository (user or organization).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiOwner {
    pub login: String,
}

/// A repository as returned by list and detail endpoints.
///
/// Detail lookups (`/repos/{owner}/{repo}`) of a fork also carry the
/// immediate `parent` and the root `source` repositories.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub updated_at: DateTime<Utc>,
    pub owner: ApiOwner,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub source: Option<Box<ApiRepository>>,
    #[serde(default)]
    pub parent: Option<Box<ApiRepository>>,
}

impl ApiRepository {
    /// The upstream repository embedded in this response, if any.
    ///
    /// Prefers the root `source` over the immediate `parent`.
    pub fn upstream(&self) -> Option<&ApiRepository> {
        self.source.as_deref().or(self.parent.as_deref())
    }

    /// Whether the repository is owned by `username` (case-insensitive, as
    /// GitHub logins are).
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner.login.eq_ignore_ascii_case(username)
    }
}

/// Repository reference inside a public event.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEventRepo {
    /// Full name, `owner/name`.
    pub name: String,
}

impl ApiEventRepo {
    /// The owner part of the event repository's full name.
    pub fn owner(&self) -> &str {
        self.name.split('/').next().unwrap_or_default()
    }
}

/// A public event from `/users/{username}/events/public`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub repo: Option<ApiEventRepo>,
}

impl ApiEvent {
    /// The referenced repository if this event counts as a contribution.
    pub fn contributed_repo(&self) -> Option<&ApiEventRepo> {
        if CONTRIBUTION_EVENT_TYPES.contains(&self.kind.as_str()) {
            self.repo.as_ref()
        } else {
            None
        }
    }
}

/// An organization from `/user/orgs`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiOrganization {
    pub login: String,
}

/// Rate limit values reported in response headers.
///
/// Any of the values may be missing; GitHub omits them on some error paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: Option<usize>,
    pub remaining: Option<usize>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitHeaders {
    /// Extract rate limit info from GitHub response headers.
    pub fn from_headers(headers: &HttpHeaders) -> Self {
        let parse = |name: &str| header_get(headers, name).and_then(|v| v.trim().parse::<i64>().ok());

        Self {
            limit: parse("x-ratelimit-limit").and_then(|v| usize::try_from(v).ok()),
            remaining: parse("x-ratelimit-remaining").and_then(|v| usize::try_from(v).ok()),
            reset_at: parse("x-ratelimit-reset").and_then(|v| DateTime::from_timestamp(v, 0)),
        }
    }
}

/// Which rate-limit tier a session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitTier {
    /// Token-authenticated requests.
    Authenticated,
    /// Unauthenticated requests, limited per source IP.
    Anonymous,
}

impl RateLimitTier {
    /// Documented core REST quota for this tier.
    pub fn requests_per_hour(self) -> u32 {
        match self {
            Self::Authenticated => 5_000,
            Self::Anonymous => 60,
        }
    }
}

impl std::fmt::Display for RateLimitTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}
