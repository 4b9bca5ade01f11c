//! Roster - per-user snapshots of GitHub repositories.
//!
//! This library aggregates the repositories a GitHub user owns, contributes
//! to, collaborates on, reaches through organizations, and has starred. The
//! result is stored on the user's profile and refreshed at most once per
//! throttle window.
//!
//! # Features
//!
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to automatically run migrations on connection.
//! - `sqlite` / `postgres` - Database backends.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roster::{connect_and_migrate, Aggregator, AggregatorConfig, SeaOrmProfileStore};
//! use roster::refresh::{RefreshRunner, RefreshScheduler};
//!
//! let db = connect_and_migrate("sqlite://roster.db?mode=rwc").await?;
//! let store = Arc::new(SeaOrmProfileStore::new(db));
//! let source = Arc::new(Aggregator::from_config(AggregatorConfig::default())?);
//! let runner = RefreshRunner::new(Arc::new(RefreshScheduler::new(source, store)));
//!
//! let ticket = runner.submit_update(user_id, "octocat", None).await?;
//! ```

pub mod aggregate;
pub mod db;
pub mod entity;
pub mod github;
pub mod http;
pub mod profile;
pub mod refresh;

#[cfg(feature = "migrate")]
pub mod migration;

pub use aggregate::{
    AggregateError, AggregationResult, Aggregator, AggregatorConfig, RepositoryRecord,
    RepositorySource,
};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use github::{ApiRateLimiter, GitHubClient, GitHubError};
pub use profile::{ProfileError, ProfileStore, SeaOrmProfileStore};
pub use refresh::{RefreshOutcome, RefreshRunner, RefreshScheduler};
