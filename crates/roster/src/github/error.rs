//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Rate limit exceeded (remaining: {remaining:?}, resets at: {reset_at:?})")]
    RateLimited {
        remaining: Option<usize>,
        reset_at: Option<DateTime<Utc>>,
    },

    #[error("Unexpected HTTP status {status} for {route}")]
    Status { status: u16, route: String },

    #[error("Unexpected response shape for {route}: {message}")]
    Decode { route: String, message: String },
}

impl GitHubError {
    /// Create a decode error for a route.
    pub fn decode(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            route: route.into(),
            message: message.into(),
        }
    }

    /// Whether this error should end pagination quietly instead of failing
    /// the caller.
    ///
    /// Transport failures, non-200 statuses and rate limits all mean "no
    /// more data from this endpoint right now". A body that does not match
    /// the expected schema is a real failure.
    #[inline]
    pub fn ends_pagination(&self) -> bool {
        !matches!(self, Self::Decode { .. })
    }
}

/// Check if a GitHubError indicates rate limiting.
pub fn is_rate_limit_error(e: &GitHubError) -> bool {
    matches!(e, GitHubError::RateLimited { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rate_limit_error() {
        let rate_limited = GitHubError::RateLimited {
            remaining: Some(0),
            reset_at: Some(Utc::now()),
        };
        assert!(is_rate_limit_error(&rate_limited));

        let status = GitHubError::Status {
            status: 500,
            route: "/users/octocat/repos".to_string(),
        };
        assert!(!is_rate_limit_error(&status));
    }

    #[test]
    fn test_decode_errors_do_not_end_pagination_quietly() {
        assert!(!GitHubError::decode("/user/orgs", "expected a sequence").ends_pagination());
        assert!(GitHubError::Http(HttpError::Transport("reset".into())).ends_pagination());
        assert!(
            GitHubError::RateLimited {
                remaining: None,
                reset_at: None
            }
            .ends_pagination()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = GitHubError::Status {
            status: 404,
            route: "/orgs/missing/repos".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("/orgs/missing/repos"));
    }
}
