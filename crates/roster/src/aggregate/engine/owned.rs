//! Repositories owned by the user.

use crate::aggregate::fork::ForkResolver;
use crate::aggregate::types::{AggregationResult, Relationship, RepositoryRecord};
use crate::github::{
    ApiRepository, GitHubError, PageWalker, PaginatedFetchConfig, is_rate_limit_error,
};

use super::FetchContext;

/// Collect the user's public repositories into the owned bucket.
///
/// Fork upstreams are injected into the collaborator-like bucket.
pub(super) async fn fetch(
    ctx: &FetchContext<'_>,
    out: &mut AggregationResult,
) -> Result<(), GitHubError> {
    let config = PaginatedFetchConfig::owned(ctx.username);
    let mut walker = PageWalker::new(ctx.client, &config);
    let mut resolver = ForkResolver::for_owned();
    let mut kept = 0usize;

    'pages: loop {
        let page = walker.page();
        let Some(repos) = walker.next_page::<ApiRepository>().await? else {
            break;
        };
        ctx.page_fetched(&config, page, repos.len());

        for repo in &repos {
            out.bucket_mut(ctx.category.bucket()).push(RepositoryRecord::from_api(
                repo,
                ctx.username,
                Relationship::Owner,
            ));
            kept += 1;

            if repo.fork {
                match resolver.resolve(ctx.client, repo, ctx.username).await {
                    Ok(Some(base)) => {
                        ctx.fork_base_added(&repo.full_name, &base);
                        out.collaborator_like.push(base);
                    }
                    Ok(None) => {}
                    Err(e) if is_rate_limit_error(&e) => {
                        ctx.quota_exhausted(&e);
                        break 'pages;
                    }
                    Err(e) => return Err(e),
                }
            }

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
    async fn test_forks_sharing_an_upstream_inject_it_once() {
        let transport = MockTransport::new();
        transport.push_json(
            owned_url("octocat", 1),
            json!([
                fork_json("octocat/fork-a", Some("upstream/project")),
                fork_json("octocat/fork-b", Some("upstream/project")),
                fork_json("octocat/fork-c", Some("upstream/project")),
            ]),
        );
        transport.push_json(owned_url("octocat", 2), json!([]));
        let client = client(&transport, None);

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Owned), &mut out)
            .await
            .unwrap();

        assert_eq!(out.owned.len(), 3);
        assert!(out.owned.iter().all(|r| r.is_owner && r.is_fork));
        assert_eq!(out.collaborator_like.len(), 1);
        assert_eq!(out.collaborator_like[0].full_name, "upstream/project");
        assert_eq!(
            out.collaborator_like[0].relationship,
            Relationship::BaseOfFork
        );
    }

    #[tokio::test]
    async fn test_fork_without_embedded_source_is_looked_up() {
        let transport = MockTransport::new();
        transport.push_json(
            owned_url("octocat", 1),
            json!([fork_json("octocat/linux", None)]),
        );
        transport.push_json(owned_url("octocat", 2), json!([]));
        transport.push_json(
            format!("{API}/repos/octocat/linux"),
            fork_json("octocat/linux", Some("torvalds/linux")),
        );
        let client = client(&transport, None);

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Owned), &mut out)
            .await
            .unwrap();

        assert_eq!(out.collaborator_like[0].full_name, "torvalds/linux");
    }

    #[tokio::test]
    async fn test_rate_limited_fork_lookup_keeps_collected_records() {
        let transport = MockTransport::new();
        transport.push_json(
            owned_url("octocat", 1),
            json!([
                repo_json("octocat/hello", 3),
                fork_json("octocat/linux", None),
                repo_json("octocat/never-reached", 1),
            ]),
        );
        transport.push_status(format!("{API}/repos/octocat/linux"), 403, Vec::new());
        let client = client(&transport, None);

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Owned), &mut out)
            .await
            .expect("rate limit is not a category failure");

        let names: Vec<_> = out.owned.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["octocat/hello", "octocat/linux"]);
        assert!(out.collaborator_like.is_empty());
        assert!(!transport.requested_urls().contains(&owned_url("octocat", 2)));
    }

    #[tokio::test]
    async fn test_rate_limit_on_first_page_leaves_bucket_empty() {
        let transport = MockTransport::new();
        transport.push_status(owned_url("octocat", 1), 403, Vec::new());
        let client = client(&transport, None);

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Owned), &mut out)
            .await
            .expect("rate limit is not an error");
        assert!(out.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_item_cap_truncates_exactly() {
        let transport = MockTransport::new();
        for page in 1..=4 {
            let repos: Vec<Value> = (0..30)
                .map(|i| repo_json(&format!("octocat/p{page}-{i}"), 0))
                .collect();
            transport.push_json(owned_url("octocat", page), Value::Array(repos));
        }
        let client = client(&transport, None);

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Owned), &mut out)
            .await
            .unwrap();

        assert_eq!(out.owned.len(), 100);
        assert_eq!(transport.requests().len(), 4);
    }
}
