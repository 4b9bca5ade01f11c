use std::sync::Arc;

use console::style;
use roster::aggregate::{Aggregator, RepositorySource};
use roster::connect_and_migrate;
use roster::profile::{ProfileStore, SeaOrmProfileStore};
use roster::refresh::{RefreshRunner, RefreshScheduler, RefreshStatus};

use crate::StoredReposAction;
use crate::commands::output::{
    OutputFormat, print_json, print_matches, print_result, print_snapshot, print_status,
};
use crate::config::Config;
use crate::progress::ProgressReporter;

/// Build an aggregator that reports progress to the terminal or the log.
fn build_aggregator(
    config: &Config,
    reporter: &Arc<ProgressReporter>,
) -> Result<Aggregator, Box<dyn std::error::Error>> {
    let aggregator = Aggregator::from_config(config.aggregator_config())?;
    Ok(aggregator.with_progress(reporter.as_callback()))
}

/// Run the aggregator for `username` and print the buckets without
/// touching the database.
pub(crate) async fn handle_fetch(
    config: &Config,
    username: &str,
    token: Option<&str>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let reporter = Arc::new(ProgressReporter::new());
    let aggregator = build_aggregator(config, &reporter)?;

    let result = aggregator.fetch_user_repositories(username, token).await;
    reporter.finish();

    print_result(&result, format)?;
    Ok(())
}

pub(crate) async fn handle_repos(
    action: StoredReposAction,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(SeaOrmProfileStore::new(
        connect_and_migrate(database_url).await?,
    ));

    match action {
        StoredReposAction::Update { target } => {
            let reporter = Arc::new(ProgressReporter::new());
            let source: Arc<dyn RepositorySource> = Arc::new(build_aggregator(config, &reporter)?);
            let scheduler = RefreshScheduler::new(source, store).with_throttle(config.throttle());
            let runner = RefreshRunner::new(Arc::new(scheduler));

            let ticket = runner
                .submit_update(target.user_id, &target.username, target.token.as_deref())
                .await?;
            println!(
                "Update {} ({})",
                ticket.status,
                if ticket.initial_fetch {
                    "initial fetch"
                } else {
                    "regular refresh"
                }
            );

            // The process owns the runtime, so wait for the job before exiting.
            let status = runner.wait(target.user_id).await;
            reporter.finish();
            report_status(status)?;
        }

        StoredReposAction::Refresh { target, force } => {
            let reporter = Arc::new(ProgressReporter::new());
            let source: Arc<dyn RepositorySource> = Arc::new(build_aggregator(config, &reporter)?);
            let scheduler = RefreshScheduler::new(source, store).with_throttle(config.throttle());

            let token = target.token.as_deref();
            let outcome = if force {
                scheduler
                    .update_forced(target.user_id, &target.username, token)
                    .await
            } else {
                scheduler
                    .update_regular(target.user_id, &target.username, token)
                    .await
            };
            reporter.finish();

            if !outcome.is_success() {
                return Err(format!("Refresh failed: {outcome}").into());
            }
            println!("{} {}", style("✓").green().bold(), outcome);
        }

        StoredReposAction::Show { user_id, format } => {
            let snapshot = store.snapshot(user_id).await?;
            print_snapshot(&snapshot, format)?;
        }

        StoredReposAction::Status { user_id, format } => {
            let status = store.status(user_id).await?;
            print_status(&status, format)?;
        }

        StoredReposAction::Search {
            full_name,
            limit,
            format,
        } => {
            let matches = store.find_by_repository(&full_name, limit).await?;
            print_matches(&matches, format)?;
        }
    }

    Ok(())
}

fn report_status(status: Option<RefreshStatus>) -> Result<(), Box<dyn std::error::Error>> {
    match status {
        Some(RefreshStatus::Succeeded { outcome }) => {
            println!("{} {}", style("✓").green().bold(), outcome);
            Ok(())
        }
        Some(RefreshStatus::Failed { reason }) => Err(format!("Update failed: {reason}").into()),
        Some(status) => {
            print_json(&status)?;
            Ok(())
        }
        None => Err("Update was not submitted".into()),
    }
}
