//! Repositories of organizations the authenticated user belongs to.

use crate::aggregate::types::{AggregationResult, Relationship, RepositoryRecord};
use crate::github::{
    ApiOrganization, ApiRepository, GitHubError, MAX_ORGANIZATIONS, PageWalker,
    PaginatedFetchConfig,
};

use super::FetchContext;

/// Collect repositories of the user's organizations that the user does not
/// own into the collaborator-like bucket.
///
/// A failing organization is logged and skipped; the remaining
/// organizations are still listed.
pub(super) async fn fetch(
    ctx: &FetchContext<'_>,
    out: &mut AggregationResult,
) -> Result<(), GitHubError> {
    let orgs = ctx
        .client
        .fetch_page::<ApiOrganization>("/user/orgs", &[])
        .await?
        .items;

    if orgs.len() > MAX_ORGANIZATIONS {
        tracing::debug!(
            username = ctx.username,
            total = orgs.len(),
            max = MAX_ORGANIZATIONS,
            "Limiting organizations"
        );
    }

    for org in orgs.iter().take(MAX_ORGANIZATIONS) {
        if let Err(e) = fetch_org(ctx, &org.login, out).await {
            tracing::warn!(
                username = ctx.username,
                org = %org.login,
                error = %e,
                "Organization repository fetch failed"
            );
        }
    }

    Ok(())
}

async fn fetch_org(
    ctx: &FetchContext<'_>,
    org: &str,
    out: &mut AggregationResult,
) -> Result<(), GitHubError> {
    let config = PaginatedFetchConfig::org_repos(org);
    let mut walker = PageWalker::new(ctx.client, &config);

    loop {
        let page = walker.page();
        let Some(repos) = walker.next_page::<ApiRepository>().await? else {
            break;
        };
        ctx.page_fetched(&config, page, repos.len());

        out.bucket_mut(ctx.category.bucket()).extend(
            repos
                .iter()
                .filter(|repo| !repo.is_owned_by(ctx.username))
                .map(|repo| {
                    RepositoryRecord::from_api(repo, ctx.username, Relationship::OrganizationMember)
                }),
        );
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
    async fn test_org_repos_are_collaborator_like() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/user/orgs"),
            json!([{ "login": "acme", "id": 1 }]),
        );
        transport.push_json(
            org_repos_url("acme", 1),
            json!([repo_json("acme/api", 10), repo_json("octocat/moved", 1)]),
        );
        transport.push_json(org_repos_url("acme", 2), json!([]));
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Organization), &mut out)
            .await
            .unwrap();

        assert_eq!(out.collaborator_like.len(), 1);
        let record = &out.collaborator_like[0];
        assert_eq!(record.full_name, "acme/api");
        assert_eq!(record.relationship, Relationship::OrganizationMember);
        assert!(record.is_collaborator);
    }

    #[tokio::test]
    async fn test_at_most_ten_organizations_are_listed() {
        let transport = MockTransport::new();
        let orgs: Vec<Value> = (0..12).map(|i| json!({ "login": format!("org{i}") })).collect();
        transport.push_json(format!("{API}/user/orgs"), Value::Array(orgs));
        for i in 0..12 {
            transport.push_json(org_repos_url(&format!("org{i}"), 1), json!([]));
        }
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Organization), &mut out)
            .await
            .unwrap();

        let urls = transport.requested_urls();
        assert_eq!(urls.len(), 1 + 10);
        assert!(!urls.contains(&org_repos_url("org10", 1)));
    }

    #[tokio::test]
    async fn test_failing_org_does_not_stop_the_next() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{API}/user/orgs"),
            json!([{ "login": "broken" }, { "login": "acme" }]),
        );
        transport.push_json(org_repos_url("broken", 1), json!({ "message": "nope" }));
        transport.push_json(org_repos_url("acme", 1), json!([repo_json("acme/api", 1)]));
        transport.push_json(org_repos_url("acme", 2), json!([]));
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Organization), &mut out)
            .await
            .unwrap();
        assert_eq!(out.collaborator_like.len(), 1);
    }

    #[tokio::test]
    async fn test_org_pages_are_capped() {
        let transport = MockTransport::new();
        transport.push_json(format!("{API}/user/orgs"), json!([{ "login": "big" }]));
        for page in 1..=3 {
            transport.push_json(
                org_repos_url("big", page),
                json!([repo_json(&format!("big/r{page}"), 0)]),
            );
        }
        let client = client(&transport, Some("t"));

        let mut out = AggregationResult::default();
        fetch(&context(&client, Category::Organization), &mut out)
            .await
            .unwrap();
        assert_eq!(out.collaborator_like.len(), 3);
        assert_eq!(transport.requests().len(), 4);
    }
}
