//! Repositories starred by the authenticated user.

use crate::aggregate::types::{AggregationResult, Relationship, RepositoryRecord};
use crate::github::{ApiRepository, GitHubError, PageWalker, PaginatedFetchConfig};

use super::FetchContext;

/// Collect starred repositories into the other bucket, skipping the user's
/// own repositories.
pub(super) async fn fetch(
    ctx: &FetchContext<'_>,
    out: &mut AggregationResult,
) -> Result<(), GitHubError> {
    let config = PaginatedFetchConfig::starred(ctx.username);
    let mut walker = PageWalker::new(ctx.client, &config);
    let mut kept = 0usize;

    'pages: loop {
        let page = walker.page();
        let Some(repos) = walker.next_page::<ApiRepository>().await? else {
            break;
        };
        ctx.page_fetched(&config, page, repos.len());

        for repo in repos.iter().filter(|r| !r.is_owned_by(ctx.username)) {
            out.bucket_mut(ctx.category.bucket()).push(RepositoryRecord::from_api(
                repo,
                ctx.username,
                Relationship::Starred,
            ));
            kept += 1;
            if config.is_full(kept) {
                break 'pages;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::aggregate::types::Category;
    use crate::http::MockTransport;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_own_repositories_are_excluded() {
        let transport = MockTransport::new();
        transport.push_json(
            starred_url(1),
            json!([repo_json("OctoCat/self-starred", 1), repo_json("tokio-rs/tokio", 2)]),
        );
        transport.push_json(starred_url(2), json!([]));
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Starred), &mut out)
            .await
            .unwrap();

        assert_eq!(out.other.len(), 1);
        assert_eq!(out.other[0].full_name, "tokio-rs/tokio");
        assert_eq!(out.other[0].relationship, Relationship::Starred);
        assert!(out.collaborator_like.is_empty());
    }

    #[tokio::test]
    async fn test_thirty_item_cap() {
        let transport = MockTransport::new();
        let page: Vec<Value> = (0..30).map(|i| repo_json(&format!("x/r{i}"), 0)).collect();
        transport.push_json(starred_url(1), Value::Array(page));
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Starred), &mut out)
            .await
            .unwrap();

        assert_eq!(out.other.len(), 30);
        assert_eq!(transport.requests().len(), 1);
    }
}
