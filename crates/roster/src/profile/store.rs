use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::profile::{
    ActiveModel, Column, Entity as Profile, Model as ProfileModel, encode_bucket,
};

use super::errors::{ProfileError, Result};
use super::types::{ProfileRefreshState, RepoMatch, RepoSnapshot, RepoStatus, SnapshotUpdate};

/// Profiles decoded per round trip while searching.
const SEARCH_PAGE_SIZE: u64 = 50;

/// Storage of per-user profiles and their repository snapshots.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Create an empty profile.
    async fn create(&self, id: Uuid) -> Result<ProfileModel>;

    async fn exists(&self, id: Uuid) -> Result<bool>;

    async fn load(&self, id: Uuid) -> Result<Option<ProfileModel>>;

    /// Replace the stored snapshot and stamp both update timestamps.
    ///
    /// # Errors
    /// Returns `ProfileError::NotFound` if no row was written.
    async fn write_snapshot(&self, id: Uuid, update: &SnapshotUpdate) -> Result<()>;

    /// Clear `github_repos_updated_at` so the next regular update passes the
    /// throttle.
    async fn clear_repos_updated_at(&self, id: Uuid) -> Result<()>;

    /// Users whose owned or collaborator-like bucket contains `full_name`.
    async fn find_by_repository(&self, full_name: &str, limit: usize) -> Result<Vec<RepoMatch>>;

    /// The scheduler's view of a profile.
    async fn refresh_state(&self, id: Uuid) -> Result<Option<ProfileRefreshState>> {
        Ok(self.load(id).await?.as_ref().map(ProfileRefreshState::from))
    }

    /// The stored buckets; empty for unknown users.
    async fn snapshot(&self, id: Uuid) -> Result<RepoSnapshot> {
        match self.load(id).await? {
            Some(model) => RepoSnapshot::from_model(&model),
            None => Ok(RepoSnapshot::default()),
        }
    }

    /// Summary of the stored owned bucket.
    async fn status(&self, id: Uuid) -> Result<RepoStatus> {
        let model = self.load(id).await?.ok_or_else(|| ProfileError::not_found(id))?;
        RepoStatus::from_model(&model)
    }
}

/// [`ProfileStore`] backed by a sea-orm connection.
#[derive(Debug)]
pub struct SeaOrmProfileStore {
    db: DatabaseConnection,
}

impl SeaOrmProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for SeaOrmProfileStore {
    async fn create(&self, id: Uuid) -> Result<ProfileModel> {
        if self.exists(id).await? {
            return Err(ProfileError::AlreadyExists { id });
        }

        let now = Utc::now().fixed_offset();
        let model = ActiveModel {
            id: Set(id),
            github_username: Set(None),
            github_repos: Set(serde_json::json!([])),
            github_repos_updated_at: Set(None),
            github_collaborator_repos: Set(serde_json::json!([])),
            github_collaborator_repos_updated_at: Set(None),
            github_other_repos: Set(serde_json::json!([])),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&self.db).await.map_err(ProfileError::from)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let count = Profile::find()
            .filter(Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn load(&self, id: Uuid) -> Result<Option<ProfileModel>> {
        Profile::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(ProfileError::from)
    }

    async fn write_snapshot(&self, id: Uuid, update: &SnapshotUpdate) -> Result<()> {
        let fetched_at = update.fetched_at.fixed_offset();
        let owned = encode_bucket(&update.repos.owned)?;
        let collaborator_like = encode_bucket(&update.repos.collaborator_like)?;
        let other = encode_bucket(&update.repos.other)?;

        let result = Profile::update_many()
            .col_expr(
                Column::GithubUsername,
                Expr::value(update.github_username.clone()),
            )
            .col_expr(Column::GithubRepos, Expr::value(owned))
            .col_expr(Column::GithubReposUpdatedAt, Expr::value(fetched_at))
            .col_expr(Column::GithubCollaboratorRepos, Expr::value(collaborator_like))
            .col_expr(
                Column::GithubCollaboratorReposUpdatedAt,
                Expr::value(fetched_at),
            )
            .col_expr(Column::GithubOtherRepos, Expr::value(other))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ProfileError::not_found(id));
        }
        Ok(())
    }

    async fn clear_repos_updated_at(&self, id: Uuid) -> Result<()> {
        let result = Profile::update_many()
            .col_expr(
                Column::GithubReposUpdatedAt,
                Expr::value(Option::<sea_orm::prelude::DateTimeWithTimeZone>::None),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ProfileError::not_found(id));
        }
        Ok(())
    }

    async fn find_by_repository(&self, full_name: &str, limit: usize) -> Result<Vec<RepoMatch>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Coarse backend-side filter on the serialized buckets; the exact,
        // case-insensitive match happens after decoding.
        let needle = serde_json::to_string(&full_name.trim().to_ascii_lowercase())?;
        let pattern = format!("%{needle}%");
        let bucket_contains = |column: Column| {
            Expr::expr(Func::lower(
                Expr::col(column).cast_as(Alias::new("text")),
            ))
            .like(pattern.clone())
        };

        let mut pages = Profile::find()
            .filter(
                Condition::any()
                    .add(bucket_contains(Column::GithubRepos))
                    .add(bucket_contains(Column::GithubCollaboratorRepos)),
            )
            .order_by_desc(Column::UpdatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, SEARCH_PAGE_SIZE);

        let mut matches = Vec::new();
        'pages: while let Some(profiles) = pages.fetch_and_next().await? {
            for model in profiles {
                // Corrupt buckets on other profiles must not break the search.
                let found = match (model.owned_repos(), model.collaborator_repos()) {
                    (Ok(owned), Ok(collaborator_like)) => owned
                        .into_iter()
                        .chain(collaborator_like)
                        .find(|r| r.full_name.eq_ignore_ascii_case(full_name.trim())),
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::warn!(user_id = %model.id, error = %e, "Skipping unreadable snapshot");
                        continue;
                    }
                };

                if let Some(repository) = found {
                    matches.push(RepoMatch {
                        user_id: model.id,
                        github_username: model.github_username.clone(),
                        repository,
                    });
                    if matches.len() >= limit {
                        break 'pages;
                    }
                }
            }
        }

        Ok(matches)
    }
}
