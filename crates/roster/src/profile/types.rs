//! Read and write shapes of the profile store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::aggregate::{AggregationResult, RepositoryRecord};
use crate::entity::profile::Model as ProfileModel;

use super::errors::Result;

/// Number of repositories included in a status sample.
pub const STATUS_SAMPLE_SIZE: usize = 3;

/// Default number of matches returned by a repository search.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// The fields the refresh scheduler decides on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRefreshState {
    pub id: Uuid,
    pub github_username: Option<String>,
    pub github_repos_updated_at: Option<DateTime<Utc>>,
    /// Number of records in the stored owned bucket.
    pub owned_count: usize,
}

impl ProfileRefreshState {
    /// Whether the next update is an initial fetch.
    ///
    /// Either a missing timestamp or an empty owned bucket is enough.
    pub fn needs_initial_fetch(&self) -> bool {
        self.github_repos_updated_at.is_none() || self.owned_count == 0
    }
}

impl From<&ProfileModel> for ProfileRefreshState {
    fn from(model: &ProfileModel) -> Self {
        Self {
            id: model.id,
            github_username: model.github_username.clone(),
            github_repos_updated_at: model
                .github_repos_updated_at
                .map(|t| t.with_timezone(&Utc)),
            owned_count: model.owned_count(),
        }
    }
}

/// A completed aggregation run, ready to replace a stored snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotUpdate {
    pub github_username: String,
    pub repos: AggregationResult,
    pub fetched_at: DateTime<Utc>,
}

impl SnapshotUpdate {
    pub fn new(github_username: impl Into<String>, repos: AggregationResult) -> Self {
        Self {
            github_username: github_username.into(),
            repos,
            fetched_at: Utc::now(),
        }
    }
}

/// The persisted buckets of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoSnapshot {
    pub github_username: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub repos: AggregationResult,
}

impl RepoSnapshot {
    pub fn from_model(model: &ProfileModel) -> Result<Self> {
        Ok(Self {
            github_username: model.github_username.clone(),
            updated_at: model.github_repos_updated_at.map(|t| t.with_timezone(&Utc)),
            repos: AggregationResult {
                owned: model.owned_repos()?,
                collaborator_like: model.collaborator_repos()?,
                other: model.other_repos()?,
            },
        })
    }
}

/// Summary of a user's stored repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub github_username: Option<String>,
    /// Number of records in the owned bucket.
    pub repo_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub profile_created: DateTime<Utc>,
    pub has_repos: bool,
    /// The first few stored owned records.
    pub sample_repos: Vec<RepositoryRecord>,
}

impl RepoStatus {
    pub fn from_model(model: &ProfileModel) -> Result<Self> {
        let owned = model.owned_repos()?;
        Ok(Self {
            github_username: model.github_username.clone(),
            repo_count: owned.len(),
            last_updated: model.github_repos_updated_at.map(|t| t.with_timezone(&Utc)),
            profile_created: model.created_at.with_timezone(&Utc),
            has_repos: !owned.is_empty(),
            sample_repos: owned.into_iter().take(STATUS_SAMPLE_SIZE).collect(),
        })
    }
}

/// A user whose stored snapshot contains a searched repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoMatch {
    pub user_id: Uuid,
    pub github_username: Option<String>,
    pub repository: RepositoryRecord,
}
