//! Aggregation engine.
//!
//! The [`Aggregator`] runs the five category fetchers sequentially against
//! one GitHub session per call, then dedupes each bucket independently.
//!
//! # Failure containment
//!
//! - Page failures (non-200, 403 rate limit, transport errors) end that
//!   endpoint's pagination and keep what was already collected.
//! - A rate limited detail lookup ends its category the same way; other
//!   lookup failures drop only that record.
//! - Category failures (a body with an unexpected shape) are logged at the
//!   category boundary; sibling categories still run.
//! - Anything else collapses the whole run into an empty result.
//!
//! # Example
//!
//! ```ignore
//! use roster::aggregate::{Aggregator, AggregatorConfig};
//!
//! let aggregator = Aggregator::from_config(AggregatorConfig::default())?;
//! let result = aggregator.fetch_user_repositories("octocat", None).await;
//! println!("{} owned repositories", result.owned.len());
//! ```

mod collaborator;
mod contributed;
mod organization;
mod owned;
mod starred;

#[cfg(test)]
mod fixtures;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;

use crate::github::{
    ApiRateLimiter, DEFAULT_API_URL, DEFAULT_USER_AGENT, GITHUB_DEFAULT_RPS, GitHubClient,
    GitHubError, PaginatedFetchConfig,
};
use crate::http::{HttpTransport, ReqwestTransport};

use super::dedupe::dedupe;
use super::error::AggregateError;
use super::progress::{AggregateProgress, ProgressCallback, emit};
use super::types::{AggregationResult, Category, RepositoryRecord};

/// Default per-call network timeout.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Process-wide aggregator settings, read-only after start-up.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// GitHub REST API base URL.
    pub api_url: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Token used when a call does not supply one.
    pub fallback_token: Option<String>,
    /// Proactive pacing; `0` disables it.
    pub requests_per_second: u32,
    /// Per-call network timeout.
    pub timeout: StdDuration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_token: None,
            requests_per_second: GITHUB_DEFAULT_RPS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Something that can produce a user's repository snapshot.
///
/// The refresh scheduler depends on this seam rather than on the
/// aggregator directly.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Aggregate the repositories of `username`.
    ///
    /// Never fails: errors degrade to partial or empty buckets.
    async fn fetch_user_repositories(&self, username: &str, token: Option<&str>)
    -> AggregationResult;
}

/// Shared state of one category fetcher invocation.
pub(crate) struct FetchContext<'a> {
    pub client: &'a GitHubClient,
    pub username: &'a str,
    pub category: Category,
    pub on_progress: Option<&'a ProgressCallback>,
}

impl FetchContext<'_> {
    pub fn page_fetched(&self, config: &PaginatedFetchConfig<'_>, page: u32, count: usize) {
        emit(
            self.on_progress,
            AggregateProgress::FetchedPage {
                category: self.category,
                namespace: config.namespace.to_string(),
                page,
                count,
            },
        );
    }

    /// Log a quota exhausted mid-category. The fetcher keeps what it has
    /// and stops.
    pub fn quota_exhausted(&self, error: &GitHubError) {
        tracing::warn!(
            username = self.username,
            category = %self.category,
            error = %error,
            "GitHub rate limit exhausted, stopping category"
        );
    }

    pub fn fork_base_added(&self, fork: &str, base: &RepositoryRecord) {
        emit(
            self.on_progress,
            AggregateProgress::ForkBaseAdded {
                category: self.category,
                fork: fork.to_string(),
                base: base.full_name.clone(),
            },
        );
    }
}

/// Aggregates a user's repositories from GitHub.
pub struct Aggregator {
    transport: Arc<dyn HttpTransport>,
    config: AggregatorConfig,
    rate_limiter: Option<ApiRateLimiter>,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl Aggregator {
    /// Create an aggregator over an explicit transport.
    pub fn new(transport: Arc<dyn HttpTransport>, config: AggregatorConfig) -> Self {
        let rate_limiter = ApiRateLimiter::new(config.requests_per_second);
        Self {
            transport,
            config,
            rate_limiter,
            on_progress: None,
        }
    }

    /// Create an aggregator backed by a reqwest transport.
    pub fn from_config(config: AggregatorConfig) -> Result<Self, AggregateError> {
        let transport = ReqwestTransport::with_timeout(config.timeout)
            .map_err(|e| AggregateError::Transport(e.to_string()))?;
        Ok(Self::new(Arc::new(transport), config))
    }

    /// Report progress through `callback`.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Open the session for one call. An explicit token wins over the
    /// configured fallback.
    fn session(&self, token: Option<&str>) -> GitHubClient {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .or(self.config.fallback_token.as_deref());
        GitHubClient::new(
            Arc::clone(&self.transport),
            &self.config.api_url,
            &self.config.user_agent,
            token,
        )
        .with_rate_limiter(self.rate_limiter.clone())
    }

    /// Aggregate the repositories of `username` into three buckets.
    ///
    /// Returns empty buckets if the run fails as a whole.
    pub async fn fetch_user_repositories(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> AggregationResult {
        match self.try_fetch(username, token).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(username, error = %e, "Repository aggregation failed");
                AggregationResult::default()
            }
        }
    }

    async fn try_fetch(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<AggregationResult, AggregateError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AggregateError::EmptyUsername);
        }

        let client = self.session(token);
        let tier = client.rate_limit_tier();
        let on_progress = self.on_progress.as_deref();

        tracing::info!(
            username,
            has_token = client.has_token(),
            tier = %tier,
            requests_per_hour = tier.requests_per_hour(),
            "Aggregating GitHub repositories"
        );
        emit(
            on_progress,
            AggregateProgress::Started {
                username: username.to_string(),
                tier,
            },
        );

        let mut raw = AggregationResult::default();
        for category in Category::ALL {
            if category.requires_token() && !client.has_token() {
                tracing::debug!(username, category = %category, "No token, skipping category");
                emit(on_progress, AggregateProgress::CategorySkipped { category });
                continue;
            }

            let ctx = FetchContext {
                client: &client,
                username,
                category,
                on_progress,
            };
            run_category(&ctx, &mut raw).await;
        }

        let result = AggregationResult {
            owned: dedupe(&raw.owned),
            collaborator_like: dedupe(&raw.collaborator_like),
            other: dedupe(&raw.other),
        };

        tracing::info!(
            username,
            owned = result.owned.len(),
            collaborator_like = result.collaborator_like.len(),
            other = result.other.len(),
            "Aggregation complete"
        );
        emit(
            on_progress,
            AggregateProgress::Complete {
                owned: result.owned.len(),
                collaborator_like: result.collaborator_like.len(),
                other: result.other.len(),
            },
        );

        Ok(result)
    }
}

/// Run one category fetcher, containing its failure.
async fn run_category(ctx: &FetchContext<'_>, raw: &mut AggregationResult) {
    emit(
        ctx.on_progress,
        AggregateProgress::CategoryStarted {
            category: ctx.category,
        },
    );

    let before = raw.total();
    let outcome: Result<(), GitHubError> = match ctx.category {
        Category::Owned => owned::fetch(ctx, raw).await,
        Category::Contributed => contributed::fetch(ctx, raw).await,
        Category::Collaborator => collaborator::fetch(ctx, raw).await,
        Category::Organization => organization::fetch(ctx, raw).await,
        Category::Starred => starred::fetch(ctx, raw).await,
    };
    let count = raw.total() - before;

    match outcome {
        Ok(()) => {
            tracing::debug!(
                username = ctx.username,
                category = %ctx.category,
                count,
                "Category complete"
            );
            emit(
                ctx.on_progress,
                AggregateProgress::CategoryComplete {
                    category: ctx.category,
                    count,
                },
            );
        }
        Err(e) => {
            let err = AggregateError::in_category(ctx.category, e);
            tracing::warn!(
                username = ctx.username,
                category = %ctx.category,
                kept = count,
                error = %err,
                "Category fetch failed"
            );
            emit(
                ctx.on_progress,
                AggregateProgress::CategoryFailed {
                    category: ctx.category,
                    error: err.to_string(),
                },
            );
        }
    }
}

#[async_trait]
impl RepositorySource for Aggregator {
    async fn fetch_user_repositories(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> AggregationResult {
        Aggregator::fetch_user_repositories(self, username, token).await
    }
}
