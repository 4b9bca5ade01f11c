//! Table and JSON rendering of snapshots.

use clap::ValueEnum;
use console::style;
use roster::aggregate::{AggregationResult, RepositoryRecord};
use roster::profile::{RepoMatch, RepoSnapshot, RepoStatus};
use serde::Serialize;

/// Output format for repository listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// One repository row.
#[derive(Debug, Clone, tabled::Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "Repository")]
    pub full_name: String,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Relationship")]
    pub relationship: String,
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl From<&RepositoryRecord> for RepoRow {
    fn from(record: &RepositoryRecord) -> Self {
        Self {
            full_name: record.full_name.clone(),
            stars: record.stars,
            language: record.language.clone().unwrap_or_else(|| "-".to_string()),
            relationship: record.relationship.to_string(),
            updated: record.updated_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, tabled::Tabled)]
pub(crate) struct MatchRow {
    #[tabled(rename = "User")]
    pub user_id: String,
    #[tabled(rename = "GitHub")]
    pub github_username: String,
    #[tabled(rename = "Repository")]
    pub full_name: String,
    #[tabled(rename = "Relationship")]
    pub relationship: String,
}

impl From<&RepoMatch> for MatchRow {
    fn from(m: &RepoMatch) -> Self {
        Self {
            user_id: m.user_id.to_string(),
            github_username: m.github_username.clone().unwrap_or_else(|| "-".to_string()),
            full_name: m.repository.full_name.clone(),
            relationship: m.repository.relationship.to_string(),
        }
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table<R: tabled::Tabled>(rows: Vec<R>) {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{table}");
}

fn print_bucket(title: &str, records: &[RepositoryRecord]) {
    println!("{} ({})", style(title).bold().cyan(), records.len());
    if records.is_empty() {
        println!("  {}", style("none").dim());
        return;
    }
    print_table(records.iter().map(RepoRow::from).collect());
}

/// Print the three buckets of an aggregation run.
pub(crate) fn print_result(
    result: &AggregationResult,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            print_bucket("Owned", &result.owned);
            print_bucket("Collaborator", &result.collaborator_like);
            print_bucket("Other", &result.other);
            Ok(())
        }
    }
}

pub(crate) fn print_snapshot(
    snapshot: &RepoSnapshot,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    if format == OutputFormat::Json {
        return print_json(snapshot);
    }
    match (&snapshot.github_username, snapshot.updated_at) {
        (Some(username), Some(at)) => {
            println!("{} as of {}", style(username).cyan(), at.to_rfc3339());
        }
        _ => println!("{}", style("Never fetched").dim()),
    }
    print_result(&snapshot.repos, format)
}

pub(crate) fn print_status(status: &RepoStatus, format: OutputFormat) -> Result<(), serde_json::Error> {
    if format == OutputFormat::Json {
        return print_json(status);
    }
    let never = || "never".to_string();
    println!(
        "GitHub user:     {}",
        status.github_username.as_deref().unwrap_or("-")
    );
    println!("Repositories:    {}", status.repo_count);
    println!(
        "Last updated:    {}",
        status.last_updated.map_or_else(never, |t| t.to_rfc3339())
    );
    println!("Profile created: {}", status.profile_created.to_rfc3339());
    if !status.sample_repos.is_empty() {
        print_table(status.sample_repos.iter().map(RepoRow::from).collect());
    }
    Ok(())
}

pub(crate) fn print_matches(matches: &[RepoMatch], format: OutputFormat) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => print_json(matches),
        OutputFormat::Table if matches.is_empty() => {
            println!("{}", style("No users found").dim());
            Ok(())
        }
        OutputFormat::Table => {
            print_table(matches.iter().map(MatchRow::from).collect());
            Ok(())
        }
    }
}
