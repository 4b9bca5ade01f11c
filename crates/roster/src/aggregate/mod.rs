//! Repository aggregation for one GitHub user.
//!
//! # Module Structure
//!
//! - [`types`] - `RepositoryRecord`, `Relationship`, `AggregationResult`
//! - [`progress`] - Progress reporting: `AggregateProgress`, `ProgressCallback`, `emit()`
//! - [`dedupe`] - Deduplication and relevance ranking of a bucket
//! - [`fork`] - Fork upstream injection
//! - [`engine`] - The `Aggregator` and its five category fetchers

pub mod dedupe;
pub mod engine;
mod error;
pub mod fork;
mod progress;
mod types;

pub use dedupe::dedupe;
pub use engine::{Aggregator, AggregatorConfig, DEFAULT_TIMEOUT, RepositorySource};
pub use error::AggregateError;
pub use fork::ForkResolver;
pub use progress::{AggregateProgress, ProgressCallback, emit};
pub use types::{AggregationResult, Bucket, Category, Relationship, RepositoryRecord};
