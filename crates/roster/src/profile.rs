//! Profile storage: per-user repository snapshots and refresh state.
//!
//! The [`ProfileStore`] trait is the seam the refresh scheduler writes
//! through; [`SeaOrmProfileStore`] is the database-backed implementation.

mod errors;
mod store;
mod types;

pub use errors::{ProfileError, Result};
pub use store::{ProfileStore, SeaOrmProfileStore};
pub use types::{
    DEFAULT_SEARCH_LIMIT, ProfileRefreshState, RepoMatch, RepoSnapshot, RepoStatus,
    STATUS_SAMPLE_SIZE, SnapshotUpdate,
};
