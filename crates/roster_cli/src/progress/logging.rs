use roster::aggregate::AggregateProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: AggregateProgress) {
        match event {
            AggregateProgress::Started { username, tier } => {
                tracing::info!(username = %username, tier = %tier, "Aggregating repositories");
            }

            AggregateProgress::CategoryStarted { category } => {
                tracing::debug!(category = %category, "Fetching category");
            }

            AggregateProgress::FetchedPage {
                category,
                namespace,
                page,
                count,
            } => {
                tracing::debug!(category = %category, namespace = %namespace, page, count, "Fetched page");
            }

            AggregateProgress::ForkBaseAdded {
                category,
                fork,
                base,
            } => {
                tracing::debug!(category = %category, fork = %fork, base = %base, "Added fork upstream");
            }

            AggregateProgress::CategoryComplete { category, count } => {
                tracing::info!(category = %category, count, "Category complete");
            }

            AggregateProgress::CategoryFailed { category, error } => {
                tracing::warn!(category = %category, error = %error, "Category failed");
            }

            AggregateProgress::CategorySkipped { category } => {
                tracing::info!(category = %category, "Category skipped, no token");
            }

            AggregateProgress::Complete {
                owned,
                collaborator_like,
                other,
            } => {
                tracing::info!(owned, collaborator_like, other, "Aggregation complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
