//! Progress reporting for aggregation runs.

use crate::github::RateLimitTier;

use super::types::Category;

/// Progress events emitted while aggregating a user's repositories.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AggregateProgress {
    /// Starting an aggregation run.
    Started {
        /// The GitHub username being aggregated.
        username: String,
        /// Rate-limit tier of the session.
        tier: RateLimitTier,
    },

    /// Starting one category fetcher.
    CategoryStarted { category: Category },

    /// Fetched a page for a category.
    FetchedPage {
        category: Category,
        /// Username or organization the page belongs to.
        namespace: String,
        /// Page number (1-indexed).
        page: u32,
        /// Number of items on the page.
        count: usize,
    },

    /// A fork's upstream was added to a bucket.
    ForkBaseAdded {
        category: Category,
        /// The fork that led to the upstream.
        fork: String,
        /// The upstream repository.
        base: String,
    },

    /// A category finished.
    CategoryComplete {
        category: Category,
        /// Records the category produced.
        count: usize,
    },

    /// A category failed; records produced before the failure are kept.
    CategoryFailed { category: Category, error: String },

    /// A category was not run because no token is available.
    CategorySkipped { category: Category },

    /// The run finished; counts are after deduplication.
    Complete {
        owned: usize,
        collaborator_like: usize,
        other: usize,
    },
}

/// Callback for progress updates during aggregation.
pub type ProgressCallback = Box<dyn Fn(AggregateProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: AggregateProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(
            Some(&callback),
            AggregateProgress::CategoryStarted {
                category: Category::Owned,
            },
        );
        emit(
            Some(&callback),
            AggregateProgress::CategoryComplete {
                category: Category::Owned,
                count: 3,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        emit(
            None,
            AggregateProgress::CategorySkipped {
                category: Category::Starred,
            },
        );
    }

    #[test]
    fn test_progress_debug() {
        let event = AggregateProgress::ForkBaseAdded {
            category: Category::Collaborator,
            fork: "octocat/linux".to_string(),
            base: "torvalds/linux".to_string(),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("ForkBaseAdded"));
        assert!(debug_str.contains("torvalds/linux"));
    }
}
