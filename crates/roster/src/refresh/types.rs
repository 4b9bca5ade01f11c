//! Outcomes and statuses of refresh runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::profile::ProfileError;

/// Default minimum interval between regular refreshes.
pub const DEFAULT_THROTTLE_HOURS: i64 = 24;

/// Result of one scheduler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Aggregation ran and the snapshot was replaced.
    Refreshed {
        owned: usize,
        collaborator_like: usize,
        other: usize,
    },
    /// The throttle window has not elapsed; nothing was fetched.
    Throttled { last_updated: DateTime<Utc> },
    /// The profile does not exist; nothing was fetched or written.
    ProfileMissing,
    /// The profile store reported an error.
    PersistFailed { reason: String },
}

impl RefreshOutcome {
    /// Whether the run counts as successful. A throttled no-op does.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Refreshed { .. } | Self::Throttled { .. })
    }
}

impl std::fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Refreshed {
                owned,
                collaborator_like,
                other,
            } => write!(
                f,
                "refreshed ({owned} owned, {collaborator_like} collaborator, {other} other)"
            ),
            Self::Throttled { last_updated } => {
                write!(f, "skipped, last updated {}", last_updated.to_rfc3339())
            }
            Self::ProfileMissing => write!(f, "profile not found"),
            Self::PersistFailed { reason } => write!(f, "persist failed: {reason}"),
        }
    }
}

/// Which scheduler entry point a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Bypasses the throttle; requires the profile to exist.
    Initial,
    /// Subject to the throttle.
    Regular,
    /// Clears the throttle timestamp, then runs Regular.
    Forced,
}

/// Status of the latest job submitted for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RefreshStatus {
    Pending,
    Running,
    Succeeded { outcome: RefreshOutcome },
    Failed { reason: String },
}

impl RefreshStatus {
    /// Whether the job has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Response of a submitted update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateTicket {
    /// Always `"processing"`: the outcome is only observable later.
    pub status: &'static str,
    pub initial_fetch: bool,
}

impl UpdateTicket {
    pub fn processing(initial_fetch: bool) -> Self {
        Self {
            status: "processing",
            initial_fetch,
        }
    }
}

/// Errors surfaced before a job is submitted.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Profile store error: {0}")]
    Store(#[from] ProfileError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_predicate() {
        assert!(
            RefreshOutcome::Refreshed {
                owned: 0,
                collaborator_like: 0,
                other: 0
            }
            .is_success()
        );
        assert!(
            RefreshOutcome::Throttled {
                last_updated: Utc::now()
            }
            .is_success()
        );
        assert!(!RefreshOutcome::ProfileMissing.is_success());
        assert!(
            !RefreshOutcome::PersistFailed {
                reason: "locked".into()
            }
            .is_success()
        );
    }

    #[test]
    fn test_status_json_shape() {
        let status = RefreshStatus::Succeeded {
            outcome: RefreshOutcome::Refreshed {
                owned: 2,
                collaborator_like: 1,
                other: 0,
            },
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({
                "state": "succeeded",
                "outcome": { "outcome": "refreshed", "owned": 2, "collaborator_like": 1, "other": 0 }
            })
        );
        assert!(status.is_finished());
        assert!(!RefreshStatus::Running.is_finished());
    }

    #[test]
    fn test_ticket_is_processing() {
        let ticket = UpdateTicket::processing(true);
        assert_eq!(
            serde_json::to_value(&ticket).unwrap(),
            json!({ "status": "processing", "initial_fetch": true })
        );
    }
}
