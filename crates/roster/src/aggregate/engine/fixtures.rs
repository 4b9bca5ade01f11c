//! Shared response builders for fetcher tests.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::aggregate::types::Category;
use crate::github::{GitHubClient, PaginatedFetchConfig};
use crate::http::MockTransport;

use super::FetchContext;

pub const API: &str = "https://api.test";

pub fn repo_json(full_name: &str, stars: u64) -> Value {
    let (owner, name) = full_name.split_once('/').unwrap();
    json!({
        "id": 1,
        "name": name,
        "full_name": full_name,
        "description": format!("{name} description"),
        "html_url": format!("https://github.com/{full_name}"),
        "language": "Rust",
        "stargazers_count": stars,
        "forks_count": 0,
        "updated_at": "2024-06-01T12:00:00Z",
        "owner": { "login": owner },
        "fork": false
    })
}

pub fn fork_json(full_name: &str, upstream: Option<&str>) -> Value {
    let mut value = repo_json(full_name, 0);
    value["fork"] = json!(true);
    if let Some(upstream) = upstream {
        value["source"] = repo_json(upstream, 50);
    }
    value
}

pub fn push_event(repo: &str) -> Value {
    event("PushEvent", repo)
}

pub fn event(kind: &str, repo: &str) -> Value {
    json!({ "id": "1", "type": kind, "repo": { "id": 1, "name": repo } })
}

fn page_url(config: PaginatedFetchConfig<'_>, page: u32) -> String {
    let client = GitHubClient::new(Arc::new(MockTransport::new()), API, "ua", None);
    client.url(&config.route, &config.page_query(page))
}

pub fn owned_url(username: &str, page: u32) -> String {
    page_url(PaginatedFetchConfig::owned(username), page)
}

pub fn events_url(username: &str, page: u32) -> String {
    page_url(PaginatedFetchConfig::events(username), page)
}

pub fn collaborator_url(page: u32) -> String {
    page_url(PaginatedFetchConfig::collaborator(""), page)
}

pub fn org_repos_url(org: &str, page: u32) -> String {
    page_url(PaginatedFetchConfig::org_repos(org), page)
}

pub fn starred_url(page: u32) -> String {
    page_url(PaginatedFetchConfig::starred(""), page)
}

pub fn client(transport: &MockTransport, token: Option<&str>) -> GitHubClient {
    GitHubClient::new(Arc::new(transport.clone()), API, "roster-test", token)
}

pub fn context<'a>(client: &'a GitHubClient, category: Category) -> FetchContext<'a> {
    FetchContext {
        client,
        username: "octocat",
        category,
        on_progress: None,
    }
}
