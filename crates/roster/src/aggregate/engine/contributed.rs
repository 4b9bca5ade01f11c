//! Repositories the user contributed to, derived from public events.

use std::collections::HashSet;

use crate::aggregate::types::{AggregationResult, Relationship, RepositoryRecord};
use crate::github::{ApiEvent, GitHubError, PageWalker, PaginatedFetchConfig, is_rate_limit_error};

use super::FetchContext;

/// Collect repositories referenced by contribution events into the owned
/// bucket.
///
/// Each newly seen repository costs one detail lookup. The item cap counts
/// unique repository names, including those whose lookup failed. A rate
/// limited lookup ends the category with the records collected so far.
pub(super) async fn fetch(
    ctx: &FetchContext<'_>,
    out: &mut AggregationResult,
) -> Result<(), GitHubError> {
    let config = PaginatedFetchConfig::events(ctx.username);
    let mut walker = PageWalker::new(ctx.client, &config);
    let mut seen: HashSet<String> = HashSet::new();

    'pages: loop {
        let page = walker.page();
        let Some(events) = walker.next_page::<ApiEvent>().await? else {
            break;
        };
        ctx.page_fetched(&config, page, events.len());

        for event in &events {
            let Some(event_repo) = event.contributed_repo() else {
                continue;
            };
            if !seen.insert(event_repo.name.clone()) {
                continue;
            }

            match ctx.client.get_repo(&event_repo.name).await {
                Ok(Some(details)) => {
                    let relationship = if event_repo.owner().eq_ignore_ascii_case(ctx.username) {
                        Relationship::Owner
                    } else {
                        Relationship::Contributor
                    };
                    out.bucket_mut(ctx.category.bucket()).push(RepositoryRecord::from_api(
                        &details,
                        ctx.username,
                        relationship,
                    ));
                }
                Ok(None) => {}
                Err(e) if is_rate_limit_error(&e) => {
                    ctx.quota_exhausted(&e);
                    break 'pages;
                }
                Err(e) => return Err(e),
            }

            if config.is_full(seen.len()) {
                break 'pages;
            }
        }
    }

    Ok(())
}
