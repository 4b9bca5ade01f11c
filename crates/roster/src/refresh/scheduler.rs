//! Per-user refresh decisions.
//!
//! ```text
//!             no timestamp or empty owned bucket
//!   update ──────────────────────────────────────▶ Initial ──▶ fetch + persist
//!      │
//!      └──▶ Regular ──▶ elapsed < throttle ──▶ Throttled (no fetch)
//!                 └───▶ elapsed ≥ throttle ──▶ fetch + persist
//!
//!   Forced = clear timestamp, then Regular
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::aggregate::RepositorySource;
use crate::profile::{ProfileError, ProfileStore, SnapshotUpdate};

use super::types::{DEFAULT_THROTTLE_HOURS, RefreshError, RefreshOutcome, UpdateKind};

/// Whether enough time has passed since `last_updated` for a regular
/// refresh.
pub fn throttle_elapsed(last_updated: DateTime<Utc>, now: DateTime<Utc>, throttle: Duration) -> bool {
    now.signed_duration_since(last_updated) >= throttle
}

/// Decides whether to aggregate a user's repositories and persists the
/// result.
pub struct RefreshScheduler {
    source: Arc<dyn RepositorySource>,
    store: Arc<dyn ProfileStore>,
    throttle: Duration,
}

impl RefreshScheduler {
    pub fn new(source: Arc<dyn RepositorySource>, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            source,
            store,
            throttle: Duration::hours(DEFAULT_THROTTLE_HOURS),
        }
    }

    /// Override the minimum interval between regular refreshes.
    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Whether the next update for `user_id` takes the initial path.
    ///
    /// Unknown profiles take the initial path, which then fails fast.
    pub async fn is_initial_fetch(&self, user_id: Uuid) -> Result<bool, RefreshError> {
        let state = self.store.refresh_state(user_id).await?;
        Ok(state.is_none_or(|s| s.needs_initial_fetch()))
    }

    /// Run the entry point named by `kind`.
    pub async fn run(
        &self,
        kind: UpdateKind,
        user_id: Uuid,
        username: &str,
        token: Option<&str>,
    ) -> RefreshOutcome {
        match kind {
            UpdateKind::Initial => self.update_initial(user_id, username, token).await,
            UpdateKind::Regular => self.update_regular(user_id, username, token).await,
            UpdateKind::Forced => self.update_forced(user_id, username, token).await,
        }
    }

    /// Initial fetch for a new user: no throttle, but the profile must exist.
    pub async fn update_initial(
        &self,
        user_id: Uuid,
        username: &str,
        token: Option<&str>,
    ) -> RefreshOutcome {
        match self.store.exists(user_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::error!(%user_id, "Profile not found, cannot update repositories");
                return RefreshOutcome::ProfileMissing;
            }
            Err(e) => return persist_failed(user_id, "check profile", e),
        }

        tracing::info!(%user_id, username, "Initial fetch of GitHub repositories");
        self.fetch_and_persist(user_id, username, token).await
    }

    /// Throttled refresh for an existing user.
    pub async fn update_regular(
        &self,
        user_id: Uuid,
        username: &str,
        token: Option<&str>,
    ) -> RefreshOutcome {
        let state = match self.store.refresh_state(user_id).await {
            Ok(state) => state,
            Err(e) => return persist_failed(user_id, "read refresh state", e),
        };

        if let Some(last_updated) = state.and_then(|s| s.github_repos_updated_at)
            && !throttle_elapsed(last_updated, Utc::now(), self.throttle)
        {
            tracing::info!(
                %user_id,
                last_updated = %last_updated,
                "GitHub repositories updated recently, skipping"
            );
            return RefreshOutcome::Throttled { last_updated };
        }

        tracing::info!(%user_id, username, "Fetching GitHub repositories");
        self.fetch_and_persist(user_id, username, token).await
    }

    /// Refresh that always passes the throttle once.
    pub async fn update_forced(
        &self,
        user_id: Uuid,
        username: &str,
        token: Option<&str>,
    ) -> RefreshOutcome {
        match self.store.clear_repos_updated_at(user_id).await {
            Ok(()) => {}
            Err(ProfileError::NotFound { .. }) => {
                tracing::error!(%user_id, "Profile not found, cannot force refresh");
                return RefreshOutcome::ProfileMissing;
            }
            Err(e) => return persist_failed(user_id, "clear refresh timestamp", e),
        }
        self.update_regular(user_id, username, token).await
    }

    async fn fetch_and_persist(
        &self,
        user_id: Uuid,
        username: &str,
        token: Option<&str>,
    ) -> RefreshOutcome {
        let repos = self.source.fetch_user_repositories(username, token).await;
        let outcome = RefreshOutcome::Refreshed {
            owned: repos.owned.len(),
            collaborator_like: repos.collaborator_like.len(),
            other: repos.other.len(),
        };

        let update = SnapshotUpdate::new(username, repos);
        if let Err(e) = self.store.write_snapshot(user_id, &update).await {
            return persist_failed(user_id, "write snapshot", e);
        }

        tracing::info!(%user_id, username, %outcome, "Stored GitHub repositories");
        self.verify(user_id).await;
        outcome
    }

    /// Read the snapshot back for the log. Failures here never fail the run.
    async fn verify(&self, user_id: Uuid) {
        match self.store.refresh_state(user_id).await {
            Ok(Some(state)) => {
                tracing::info!(%user_id, stored = state.owned_count, "Verified stored repositories");
            }
            Ok(None) => {
                tracing::warn!(%user_id, "Profile disappeared after update");
            }
            Err(e) => {
                tracing::warn!(
                    %user_id,
                    error = %e,
                    "Update may have succeeded but verification failed"
                );
            }
        }
    }
}

fn persist_failed(user_id: Uuid, action: &str, error: ProfileError) -> RefreshOutcome {
    tracing::error!(%user_id, action, error = %error, "Profile store error");
    RefreshOutcome::PersistFailed {
        reason: format!("{action}: {error}"),
    }
}
