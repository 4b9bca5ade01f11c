//! Aggregation error types.

use thiserror::Error;

use crate::github::GitHubError;

use super::types::Category;

/// Errors raised inside an aggregation run.
///
/// None of these reach callers of [`Aggregator::fetch_user_repositories`]:
/// category errors are logged at the category boundary and run-level errors
/// collapse into an empty result.
///
/// [`Aggregator::fetch_user_repositories`]: super::Aggregator::fetch_user_repositories
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("HTTP transport unavailable: {0}")]
    Transport(String),

    #[error("{category} fetch failed: {source}")]
    Category {
        category: Category,
        #[source]
        source: GitHubError,
    },
}

impl AggregateError {
    /// Attach the category a GitHub error was raised in.
    pub fn in_category(category: Category, source: GitHubError) -> Self {
        Self::Category { category, source }
    }
}
