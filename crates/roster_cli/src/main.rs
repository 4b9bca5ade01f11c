//! Roster CLI - command-line interface for per-user GitHub repository snapshots.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::commands::output::OutputFormat;

#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "Per-user snapshots of GitHub repositories")]
#[command(
    long_about = "Roster aggregates the GitHub repositories a user owns, contributes to, \
collaborates on, reaches through organizations, and has starred. Snapshots are stored \
on the user's profile and refreshed at most once per throttle window."
)]
#[command(after_long_help = r#"EXAMPLES
    Preview a user's repositories without storing anything:
        $ roster repos fetch octocat

    Create a profile and run its initial fetch:
        $ roster profile create
        $ roster repos update --user-id <UUID> --username octocat

    Refresh now, ignoring the throttle:
        $ roster repos refresh --user-id <UUID> --username octocat --force

    Find users who have a repository:
        $ roster repos search rust-lang/rust

    Generate shell completions:
        $ roster completions bash > ~/.local/share/bash-completion/completions/roster

CONFIGURATION
    Roster reads configuration from:
      1. ~/.config/roster/config.toml (or $XDG_CONFIG_HOME/roster/config.toml)
      2. ./roster.toml
      3. Environment variables (ROSTER_ prefix, e.g., ROSTER_GITHUB__TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    ROSTER_DATABASE__URL                 Database connection string (default: ~/.local/state/roster/roster.db)
    ROSTER_GITHUB__TOKEN                 GitHub personal access token
    GITHUB_TOKEN                         Used when no token is configured
    ROSTER_GITHUB__REQUESTS_PER_SECOND   Proactive request pacing (default: 10, 0 disables)
    ROSTER_REFRESH__THROTTLE_HOURS       Minimum hours between refreshes (default: 24)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Fetch, store and query repository snapshots
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Create an empty profile
    Create {
        /// Profile id (generated if not specified)
        #[arg(long)]
        id: Option<Uuid>,
    },
}

/// Identifies whose snapshot to update.
#[derive(Debug, Clone, Args)]
struct UpdateTarget {
    /// Profile id
    #[arg(short = 'u', long)]
    user_id: Uuid,

    /// GitHub username to aggregate
    #[arg(short = 'n', long)]
    username: String,

    /// GitHub token for this call (overrides config and GITHUB_TOKEN)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum ReposAction {
    /// Aggregate a user's repositories and print them without storing
    Fetch {
        /// GitHub username
        username: String,

        /// GitHub token for this call (overrides config and GITHUB_TOKEN)
        #[arg(short, long)]
        token: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    #[command(flatten)]
    Stored(StoredReposAction),
}

/// Repository commands that read or write the profile store.
#[derive(Subcommand)]
enum StoredReposAction {
    /// Submit an update in the background (initial fetch or throttled refresh)
    Update {
        #[command(flatten)]
        target: UpdateTarget,
    },
    /// Refresh a stored snapshot now, subject to the throttle
    Refresh {
        #[command(flatten)]
        target: UpdateTarget,

        /// Clear the last update time first so the throttle passes
        #[arg(short, long)]
        force: bool,
    },
    /// Show a stored snapshot
    Show {
        /// Profile id
        user_id: Uuid,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show a summary of a stored snapshot
    Status {
        /// Profile id
        user_id: Uuid,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Find users whose snapshot contains a repository
    Search {
        /// Repository full name (owner/name)
        full_name: String,

        /// Maximum number of users to return
        #[arg(short, long, default_value_t = roster::profile::DEFAULT_SEARCH_LIMIT)]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Spinners cover progress on a terminal, so only warnings are logged there
    // unless RUST_LOG says otherwise.
    let default_filter = if Term::stderr().is_term() {
        "roster=warn,roster_cli=warn"
    } else {
        "roster=info,roster_cli=info"
    };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_filter),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    // Handle commands that don't require database access first
    match cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output)?;
            return Ok(());
        }
        Commands::Repos {
            action:
                ReposAction::Fetch {
                    username,
                    token,
                    format,
                },
        } => {
            commands::repos::handle_fetch(&config, &username, token.as_deref(), format).await?;
            return Ok(());
        }
        command => run_with_database(command, &config).await,
    }
}

async fn run_with_database(
    command: Commands,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set ROSTER_DATABASE__URL")?;

    if let Some(path) = config::sqlite_file_path(&database_url) {
        if path.is_relative() {
            tracing::warn!(
                path = %path.display(),
                "SQLite database path is relative to the working directory"
            );
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
    }

    match command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Profile { action } => {
            commands::profile::handle_profile(action, &database_url).await?;
        }
        Commands::Repos {
            action: ReposAction::Stored(action),
        } => {
            commands::repos::handle_repos(action, config, &database_url).await?;
        }
        Commands::Repos {
            action: ReposAction::Fetch { .. },
        }
        | Commands::Completions { .. }
        | Commands::Man { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_refresh_with_force() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "roster",
            "repos",
            "refresh",
            "--user-id",
            &id.to_string(),
            "--username",
            "octocat",
            "--force",
        ])
        .unwrap();

        match cli.command {
            Commands::Repos {
                action: ReposAction::Stored(StoredReposAction::Refresh { target, force }),
            } => {
                assert_eq!(target.user_id, id);
                assert_eq!(target.username, "octocat");
                assert!(target.token.is_none());
                assert!(force);
            }
            _ => panic!("expected repos refresh"),
        }
    }

    #[test]
    fn fetch_is_kept_apart_from_store_commands() {
        let cli =
            Cli::try_parse_from(["roster", "repos", "fetch", "octocat", "-f", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Repos {
                action: ReposAction::Fetch {
                    format: OutputFormat::Json,
                    ..
                }
            }
        ));

        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["roster", "repos", "show", &id]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Repos {
                action: ReposAction::Stored(StoredReposAction::Show { .. })
            }
        ));
    }

    #[test]
    fn search_limit_defaults_to_ten() {
        let cli = Cli::try_parse_from(["roster", "repos", "search", "rust-lang/rust"]).unwrap();
        match cli.command {
            Commands::Repos {
                action: ReposAction::Stored(StoredReposAction::Search { limit, .. }),
            } => assert_eq!(limit, 10),
            _ => panic!("expected repos search"),
        }
    }
}
