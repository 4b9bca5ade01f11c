//! Throttled refresh of stored repository snapshots.
//!
//! # Module Structure
//!
//! - [`types`] - `RefreshOutcome`, `RefreshStatus`, `UpdateKind`, `UpdateTicket`
//! - [`scheduler`] - Throttle and initial-fetch decisions: `RefreshScheduler`
//! - [`runner`] - Background job execution: `RefreshRunner`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roster::aggregate::{Aggregator, AggregatorConfig};
//! use roster::profile::SeaOrmProfileStore;
//! use roster::refresh::{RefreshRunner, RefreshScheduler};
//!
//! let source = Arc::new(Aggregator::from_config(AggregatorConfig::default())?);
//! let store = Arc::new(SeaOrmProfileStore::new(db));
//! let runner = RefreshRunner::new(Arc::new(RefreshScheduler::new(source, store)));
//!
//! let ticket = runner.submit_update(user_id, "octocat", None).await?;
//! let status = runner.wait(user_id).await;
//! ```

pub mod runner;
pub mod scheduler;
mod types;

pub use runner::RefreshRunner;
pub use scheduler::{RefreshScheduler, throttle_elapsed};
pub use types::{
    DEFAULT_THROTTLE_HOURS, RefreshError, RefreshOutcome, RefreshStatus, UpdateKind, UpdateTicket,
};
