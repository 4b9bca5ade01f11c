//! Repositories the authenticated user collaborates on.

use crate::aggregate::fork::ForkResolver;
use crate::aggregate::types::{AggregationResult, Relationship, RepositoryRecord};
use crate::github::{
    ApiRepository, GitHubError, PageWalker, PaginatedFetchConfig, is_rate_limit_error,
};

use super::FetchContext;

/// Collect collaborator repositories, and the upstreams of any forks among
/// them, into the collaborator-like bucket.
pub(super) async fn fetch(
    ctx: &FetchContext<'_>,
    out: &mut AggregationResult,
) -> Result<(), GitHubError> {
    let config = PaginatedFetchConfig::collaborator(ctx.username);
    let mut walker = PageWalker::new(ctx.client, &config);
    let mut resolver = ForkResolver::for_collaborator();
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
                Relationship::Collaborator,
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
    use serde_json::json;

    #[tokio::test]
    async fn test_collaborator_records_and_fork_bases() {
        let transport = MockTransport::new();
        transport.push_json(
            collaborator_url(1),
            json!([
                repo_json("team/app", 4),
                fork_json("team/linux", Some("torvalds/linux")),
                fork_json("team/linux-2", Some("torvalds/linux")),
            ]),
        );
        transport.push_json(collaborator_url(2), json!([]));
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Collaborator), &mut out)
            .await
            .unwrap();

        assert!(out.owned.is_empty());
        let names: Vec<_> = out
            .collaborator_like
            .iter()
            .map(|r| (r.full_name.as_str(), r.relationship))
            .collect();
        assert_eq!(
            names,
            vec![
                ("team/app", Relationship::Collaborator),
                ("team/linux", Relationship::Collaborator),
                ("torvalds/linux", Relationship::BaseOfCollaboratorFork),
                ("team/linux-2", Relationship::Collaborator),
            ]
        );
        assert!(out.collaborator_like.iter().all(|r| r.is_collaborator));
    }

    #[tokio::test]
    async fn test_stops_at_page_cap() {
        let transport = MockTransport::new();
        for page in 1..=5 {
            transport.push_json(
                collaborator_url(page),
                json!([repo_json(&format!("team/r{page}"), 0)]),
            );
        }
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Collaborator), &mut out)
            .await
            .unwrap();

        assert_eq!(out.collaborator_like.len(), 5);
        assert_eq!(transport.requests().len(), 5);
    }
}
