//! Core types for repository aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::github::ApiRepository;

/// Why a repository appears in a user's snapshot.
///
/// Informational only; bucketing is decided by the fetcher that produced the
/// record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Owner,
    Collaborator,
    Contributor,
    OrganizationMember,
    BaseOfFork,
    BaseOfCollaboratorFork,
    Starred,
}

impl Relationship {
    /// Whether records with this relationship are flagged `is_collaborator`.
    pub fn marks_collaborator(self) -> bool {
        matches!(
            self,
            Self::Collaborator
                | Self::OrganizationMember
                | Self::BaseOfFork
                | Self::BaseOfCollaboratorFork
        )
    }

    /// Whether this relationship was synthesized from a fork's upstream.
    pub fn is_fork_base(self) -> bool {
        matches!(self, Self::BaseOfFork | Self::BaseOfCollaboratorFork)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Collaborator => "collaborator",
            Self::Contributor => "contributor",
            Self::OrganizationMember => "organization_member",
            Self::BaseOfFork => "base_of_fork",
            Self::BaseOfCollaboratorFork => "base_of_collaborator_fork",
            Self::Starred => "starred",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One GitHub repository as observed during a fetch.
///
/// Records are never mutated after construction; deduplication only selects
/// among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    /// `owner/name`, the identity of the record within one run.
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub updated_at: DateTime<Utc>,
    /// Owner login.
    pub owner: String,
    pub is_owner: bool,
    pub is_collaborator: bool,
    pub is_fork: bool,
    pub relationship: Relationship,
}

impl RepositoryRecord {
    /// Build a record from an API repository seen while aggregating for
    /// `username`.
    ///
    /// Fork bases are never flagged as owned, whoever owns them.
    pub fn from_api(repo: &ApiRepository, username: &str, relationship: Relationship) -> Self {
        Self {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            description: repo.description.clone(),
            html_url: repo.html_url.clone(),
            language: repo.language.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated_at: repo.updated_at,
            owner: repo.owner.login.clone(),
            is_owner: !relationship.is_fork_base() && repo.is_owned_by(username),
            is_collaborator: relationship.marks_collaborator(),
            is_fork: repo.fork,
            relationship,
        }
    }
}

/// The category fetchers, in the order the aggregator runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Owned,
    Contributed,
    Collaborator,
    Organization,
    Starred,
}

impl Category {
    /// All categories in execution order.
    pub const ALL: [Category; 5] = [
        Self::Owned,
        Self::Contributed,
        Self::Collaborator,
        Self::Organization,
        Self::Starred,
    ];

    /// Whether the category only runs with an access token.
    pub fn requires_token(self) -> bool {
        matches!(self, Self::Collaborator | Self::Organization | Self::Starred)
    }

    /// The output bucket records of this category land in.
    pub fn bucket(self) -> Bucket {
        match self {
            Self::Owned | Self::Contributed => Bucket::Owned,
            Self::Collaborator | Self::Organization => Bucket::CollaboratorLike,
            Self::Starred => Bucket::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::Contributed => "contributed",
            Self::Collaborator => "collaborator",
            Self::Organization => "organization",
            Self::Starred => "starred",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three output collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Owned,
    CollaboratorLike,
    Other,
}

/// Result of one aggregation run.
///
/// Built fresh on every run and never merged with a previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub owned: Vec<RepositoryRecord>,
    pub collaborator_like: Vec<RepositoryRecord>,
    pub other: Vec<RepositoryRecord>,
}

impl AggregationResult {
    /// Total number of records across all buckets.
    pub fn total(&self) -> usize {
        self.owned.len() + self.collaborator_like.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Mutable access to a bucket.
    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<RepositoryRecord> {
        match bucket {
            Bucket::Owned => &mut self.owned,
            Bucket::CollaboratorLike => &mut self.collaborator_like,
            Bucket::Other => &mut self.other,
        }
    }
}
