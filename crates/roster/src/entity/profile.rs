//! Profile entity - per-user repository snapshot and refresh state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::RepositoryRecord;

/// Profile model - one row per user.
///
/// Repository buckets are stored as JSON arrays of
/// [`RepositoryRecord`] so the snapshot is replaced in a single write.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// User id, assigned by the profile lifecycle outside this crate.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// GitHub login the snapshot was last fetched for.
    pub github_username: Option<String>,

    // ─── Snapshot ────────────────────────────────────────────────────────────
    /// Owned bucket.
    #[sea_orm(column_type = "Json")]
    pub github_repos: Json,
    /// When the owned bucket was last written; drives the refresh throttle.
    pub github_repos_updated_at: Option<DateTimeWithTimeZone>,
    /// Collaborator-like bucket.
    #[sea_orm(column_type = "Json")]
    pub github_collaborator_repos: Json,
    pub github_collaborator_repos_updated_at: Option<DateTimeWithTimeZone>,
    /// Other (starred) bucket.
    #[sea_orm(column_type = "Json")]
    pub github_other_repos: Json,

    // ─── Tracking ────────────────────────────────────────────────────────────
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decoded owned bucket.
    pub fn owned_repos(&self) -> Result<Vec<RepositoryRecord>, serde_json::Error> {
        decode_bucket(&self.github_repos)
    }

    /// Decoded collaborator-like bucket.
    pub fn collaborator_repos(&self) -> Result<Vec<RepositoryRecord>, serde_json::Error> {
        decode_bucket(&self.github_collaborator_repos)
    }

    /// Decoded other bucket.
    pub fn other_repos(&self) -> Result<Vec<RepositoryRecord>, serde_json::Error> {
        decode_bucket(&self.github_other_repos)
    }

    /// Number of records in the owned bucket, without decoding them.
    pub fn owned_count(&self) -> usize {
        self.github_repos.as_array().map_or(0, Vec::len)
    }
}

/// Decode a JSON bucket; `null` reads as empty.
pub fn decode_bucket(value: &Json) -> Result<Vec<RepositoryRecord>, serde_json::Error> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone())
}

/// Encode a bucket for storage.
pub fn encode_bucket(records: &[RepositoryRecord]) -> Result<Json, serde_json::Error> {
    serde_json::to_value(records)
}
