//! Configuration file support for roster.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `ROSTER_`, section and key joined
//!    by `__`, e.g., `ROSTER_DATABASE__URL`)
//! 3. Config file (./roster.toml, then ~/.config/roster/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/roster/roster.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/roster/roster.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."  # or use ROSTER_GITHUB__TOKEN / GITHUB_TOKEN
//! api_url = "https://api.github.com"
//! user_agent = "roster"
//! requests_per_second = 10  # 0 disables proactive pacing
//! timeout_secs = 30
//!
//! [refresh]
//! throttle_hours = 24
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use roster::aggregate::{AggregatorConfig, DEFAULT_TIMEOUT};
use roster::github::{DEFAULT_API_URL, DEFAULT_USER_AGENT, GITHUB_DEFAULT_RPS};
use roster::refresh::DEFAULT_THROTTLE_HOURS;
use serde::Deserialize;

/// Environment variable consulted when no token is configured.
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Refresh scheduling.
    pub refresh: RefreshConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    /// Defaults to `sqlite://~/.local/state/roster/roster.db` if not specified.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via ROSTER_GITHUB__TOKEN or GITHUB_TOKEN.
    pub token: Option<String>,
    /// REST API base URL.
    pub api_url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Proactive request pacing; 0 disables it.
    pub requests_per_second: u32,
    /// Per-call network timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requests_per_second: GITHUB_DEFAULT_RPS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Refresh scheduling options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Minimum hours between regular refreshes of one user.
    pub throttle_hours: i64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            throttle_hours: DEFAULT_THROTTLE_HOURS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/roster/config.toml)
    /// 3. Local config file (./roster.toml)
    /// 4. Environment variables with ROSTER_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        // Local config file (higher priority than XDG)
        let local_config = PathBuf::from("roster.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./roster.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., ROSTER_GITHUB__REQUESTS_PER_SECOND -> github.requests_per_second
        builder = builder.add_source(
            Environment::with_prefix("ROSTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter enables read-write access and creates the file
    /// if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("roster.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// The token used when a command does not supply one.
    ///
    /// The configured token wins over `GITHUB_TOKEN`. Blank values count as
    /// unset.
    pub fn github_token(&self) -> Option<String> {
        resolve_token(
            self.github.token.as_deref(),
            std::env::var(GITHUB_TOKEN_ENV).ok().as_deref(),
        )
    }

    /// Aggregator settings with the resolved fallback token.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            api_url: self.github.api_url.clone(),
            user_agent: self.github.user_agent.clone(),
            fallback_token: self.github_token(),
            requests_per_second: self.github.requests_per_second,
            timeout: Duration::from_secs(self.github.timeout_secs),
        }
    }

    /// Minimum interval between regular refreshes.
    pub fn throttle(&self) -> chrono::Duration {
        chrono::Duration::hours(self.refresh.throttle_hours)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "roster").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/roster` or `~/.local/state/roster`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "roster").map(|dirs| {
            // state_dir() returns None on macOS/Windows, fall back to data_dir
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

/// On-disk path of a `sqlite://` URL, without its query string.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty() && !path.contains(":memory:")).then(|| PathBuf::from(path))
}

/// First non-blank token among the configured one and the environment's.
fn resolve_token(configured: Option<&str>, env: Option<&str>) -> Option<String> {
    [configured, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(content: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(config::File::from_str(content, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.url.is_none());
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.user_agent, "roster");
        assert_eq!(config.github.requests_per_second, 10);
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.refresh.throttle_hours, 24);
    }

    #[test]
    fn test_full_config_parsing() {
        let config = from_toml(
            r#"
            [database]
            url = "sqlite:///tmp/test.db"

            [github]
            token = "ghp_test123"
            api_url = "https://ghe.example.com/api/v3"
            user_agent = "roster-test"
            requests_per_second = 0
            timeout_secs = 5

            [refresh]
            throttle_hours = 6
        "#,
        );

        assert_eq!(config.database.url.as_deref(), Some("sqlite:///tmp/test.db"));
        assert_eq!(config.github.token.as_deref(), Some("ghp_test123"));
        assert_eq!(config.throttle(), chrono::Duration::hours(6));

        let aggregator = config.aggregator_config();
        assert_eq!(aggregator.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(aggregator.user_agent, "roster-test");
        assert_eq!(aggregator.requests_per_second, 0);
        assert_eq!(aggregator.timeout, Duration::from_secs(5));
        assert_eq!(aggregator.fallback_token.as_deref(), Some("ghp_test123"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = from_toml(
            r#"
            [github]
            requests_per_second = 2
        "#,
        );
        assert_eq!(config.github.requests_per_second, 2);
        assert_eq!(config.github.timeout_secs, 30);
        assert_eq!(config.refresh.throttle_hours, 24);
    }

    #[test]
    fn test_token_resolution_order() {
        assert_eq!(
            resolve_token(Some("configured"), Some("env")).as_deref(),
            Some("configured")
        );
        assert_eq!(resolve_token(None, Some("env")).as_deref(), Some("env"));
        assert_eq!(resolve_token(Some("  "), Some("env")).as_deref(), Some("env"));
        assert_eq!(resolve_token(None, Some("")), None);
        assert_eq!(resolve_token(None, None), None);
    }

    #[test]
    fn test_database_url_defaults_to_state_dir() {
        let url = Config::default().database_url().unwrap();
        assert!(url.starts_with("sqlite://"));
        assert!(url.contains("roster.db"));
        assert!(url.ends_with("?mode=rwc"));
    }

    #[test]
    fn test_database_url_respects_configured_value() {
        let config = from_toml(
            r#"
            [database]
            url = "postgres://localhost/roster"
        "#,
        );
        assert_eq!(
            config.database_url().as_deref(),
            Some("postgres://localhost/roster")
        );
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite:///var/lib/roster/roster.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/roster/roster.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite://roster.db"),
            Some(PathBuf::from("roster.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/roster"), None);
    }

    #[test]
    fn test_default_state_dir() {
        let path = Config::default_state_dir().unwrap();
        assert!(path.to_string_lossy().contains("roster"));
    }
}
