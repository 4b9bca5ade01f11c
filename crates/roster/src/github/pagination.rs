//! Bounded page walking over GitHub list endpoints.
//!
//! Every list endpoint the aggregator reads is described by a
//! [`PaginatedFetchConfig`]: its route, base query, page size and the caps
//! that bound the worst-case number of calls. [`PageWalker`] then walks the
//! pages one at a time so callers can do async work per item (detail
//! lookups, fork resolution) between pages.

use serde::de::DeserializeOwned;

use super::client::{GitHubClient, Query};
use super::error::GitHubError;

/// Page size used for every paginated category.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Maximum number of organizations whose repositories are listed.
pub const MAX_ORGANIZATIONS: usize = 10;

/// Configuration for a paginated fetch operation.
#[derive(Debug, Clone)]
pub struct PaginatedFetchConfig<'a> {
    /// Category label (used for logging and progress reporting).
    pub category: &'static str,
    /// Namespace identifier: the username or organization being listed.
    pub namespace: &'a str,
    /// API route, without query string.
    pub route: String,
    /// Query parameters sent with every page, before `per_page`/`page`.
    pub query: Query,
    /// Items requested per page.
    pub per_page: u32,
    /// Hard cap on the number of pages requested.
    pub max_pages: u32,
    /// Cap on the number of items the caller keeps, if any.
    pub max_items: Option<usize>,
}

impl<'a> PaginatedFetchConfig<'a> {
    /// Public repositories owned by `username`, most recently updated first.
    pub fn owned(username: &'a str) -> Self {
        Self {
            category: "owned",
            namespace: username,
            route: format!("/users/{}/repos", username),
            query: sorted_by_update(vec![("type", "owner".to_string())]),
            per_page: DEFAULT_PER_PAGE,
            max_pages: 4,
            max_items: Some(100),
        }
    }

    /// Public event stream of `username`.
    ///
    /// `max_items` bounds the number of unique repositories collected, not
    /// the number of events read.
    pub fn events(username: &'a str) -> Self {
        Self {
            category: "contributed",
            namespace: username,
            route: format!("/users/{}/events/public", username),
            query: Vec::new(),
            per_page: DEFAULT_PER_PAGE,
            max_pages: 3,
            max_items: Some(50),
        }
    }

    /// Repositories the authenticated user collaborates on.
    pub fn collaborator(username: &'a str) -> Self {
        Self {
            category: "collaborator",
            namespace: username,
            route: "/user/repos".to_string(),
            query: sorted_by_update(vec![("affiliation", "collaborator".to_string())]),
            per_page: DEFAULT_PER_PAGE,
            max_pages: 5,
            max_items: Some(50),
        }
    }

    /// Repositories of one organization.
    pub fn org_repos(org: &'a str) -> Self {
        Self {
            category: "organization",
            namespace: org,
            route: format!("/orgs/{}/repos", org),
            query: sorted_by_update(Vec::new()),
            per_page: DEFAULT_PER_PAGE,
            max_pages: 3,
            max_items: None,
        }
    }

    /// Repositories starred by the authenticated user.
    pub fn starred(username: &'a str) -> Self {
        Self {
            category: "starred",
            namespace: username,
            route: "/user/starred".to_string(),
            query: sorted_by_update(Vec::new()),
            per_page: DEFAULT_PER_PAGE,
            max_pages: 3,
            max_items: Some(30),
        }
    }

    /// Full query for a 1-based page number.
    pub fn page_query(&self, page: u32) -> Query {
        let mut query = self.query.clone();
        query.push(("per_page", self.per_page.to_string()));
        query.push(("page", page.to_string()));
        query
    }

    /// Whether `count` kept items reaches the item cap.
    pub fn is_full(&self, count: usize) -> bool {
        self.max_items.is_some_and(|max| count >= max)
    }
}

fn sorted_by_update(mut query: Query) -> Query {
    query.push(("sort", "updated".to_string()));
    query.push(("direction", "desc".to_string()));
    query
}

/// Walks the pages of one endpoint until exhaustion or the page cap.
#[derive(Debug)]
pub struct PageWalker<'c, 'a> {
    client: &'c GitHubClient,
    config: &'c PaginatedFetchConfig<'a>,
    page: u32,
    done: bool,
}

impl<'c, 'a> PageWalker<'c, 'a> {
    pub fn new(client: &'c GitHubClient, config: &'c PaginatedFetchConfig<'a>) -> Self {
        Self {
            client,
            config,
            page: 1,
            done: false,
        }
    }

    /// Number of the page the next call to [`next_page`](Self::next_page)
    /// requests.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the endpoint is exhausted, a page failed, or
    /// the page cap is reached. Only schema mismatches are errors.
    pub async fn next_page<T: DeserializeOwned>(&mut self) -> Result<Option<Vec<T>>, GitHubError> {
        if self.done || self.page > self.config.max_pages {
            return Ok(None);
        }

        let query = self.config.page_query(self.page);
        let page = self.client.fetch_page::<T>(&self.config.route, &query).await?;

        tracing::debug!(
            category = self.config.category,
            namespace = self.config.namespace,
            page = self.page,
            count = page.items.len(),
            "Fetched page"
        );

        self.page += 1;
        if !page.should_continue {
            self.done = true;
        }
        if page.items.is_empty() {
            return Ok(None);
        }
        Ok(Some(page.items))
    }
}
