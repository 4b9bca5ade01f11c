//! Background execution of refresh jobs.
//!
//! Submitting a job returns immediately. The job runs on its own task and a
//! supervisor task records the final [`RefreshStatus`], including panics.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

use super::scheduler::RefreshScheduler;
use super::types::{RefreshError, RefreshOutcome, RefreshStatus, UpdateKind, UpdateTicket};

/// Latest status for a user, tagged with the job that produced it.
#[derive(Debug, Clone)]
struct Tracked {
    job: u64,
    status: RefreshStatus,
}

/// One status per user is kept for polling. Supervisor handles only live
/// until their job finishes or is awaited.
#[derive(Default)]
struct RunnerState {
    next_job: u64,
    statuses: HashMap<Uuid, Tracked>,
    handles: HashMap<Uuid, JoinHandle<()>>,
}

impl RunnerState {
    /// Update the status if `job` is still the latest job of `user_id`.
    fn set_status(&mut self, user_id: Uuid, job: u64, status: RefreshStatus) -> bool {
        match self.statuses.get_mut(&user_id) {
            Some(tracked) if tracked.job == job => {
                tracked.status = status;
                true
            }
            _ => false,
        }
    }
}

/// Runs refresh jobs in the background and tracks their status.
#[derive(Clone)]
pub struct RefreshRunner {
    scheduler: Arc<RefreshScheduler>,
    state: Arc<Mutex<RunnerState>>,
}

impl RefreshRunner {
    pub fn new(scheduler: Arc<RefreshScheduler>) -> Self {
        Self {
            scheduler,
            state: Arc::new(Mutex::new(RunnerState::default())),
        }
    }

    pub fn scheduler(&self) -> &Arc<RefreshScheduler> {
        &self.scheduler
    }

    /// Accept an update for `user_id`, picking the initial or regular path.
    ///
    /// Returns as soon as the job is submitted. The outcome is only
    /// observable through [`status`](Self::status) or [`wait`](Self::wait).
    pub async fn submit_update(
        &self,
        user_id: Uuid,
        username: &str,
        token: Option<&str>,
    ) -> Result<UpdateTicket, RefreshError> {
        let initial_fetch = self.scheduler.is_initial_fetch(user_id).await?;
        let kind = if initial_fetch {
            UpdateKind::Initial
        } else {
            UpdateKind::Regular
        };
        self.submit(user_id, username, token, kind).await;
        Ok(UpdateTicket::processing(initial_fetch))
    }

    /// Submit a job of the given kind. A newer job for the same user
    /// supersedes the older one's status.
    pub async fn submit(&self, user_id: Uuid, username: &str, token: Option<&str>, kind: UpdateKind) {
        let mut state = self.state.lock().await;
        state.next_job += 1;
        let job_id = state.next_job;
        state.statuses.insert(
            user_id,
            Tracked {
                job: job_id,
                status: RefreshStatus::Pending,
            },
        );

        let job = {
            let scheduler = self.scheduler.clone();
            let shared = self.state.clone();
            let username = username.to_string();
            let token = token.map(str::to_string);
            tokio::spawn(async move {
                record(&shared, user_id, job_id, RefreshStatus::Running).await;
                scheduler
                    .run(kind, user_id, &username, token.as_deref())
                    .await
            })
        };

        let shared = self.state.clone();
        let supervisor = tokio::spawn(async move {
            let status = match job.await {
                Ok(outcome) => finished(outcome),
                Err(e) => {
                    let reason = join_failure(e);
                    tracing::error!(%user_id, reason = %reason, "Refresh job failed");
                    RefreshStatus::Failed { reason }
                }
            };
            complete(&shared, user_id, job_id, status).await;
        });

        tracing::debug!(%user_id, job = job_id, ?kind, "Submitted refresh job");
        state.handles.insert(user_id, supervisor);
    }

    /// Status of the latest job submitted for `user_id`.
    pub async fn status(&self, user_id: Uuid) -> Option<RefreshStatus> {
        let state = self.state.lock().await;
        state.statuses.get(&user_id).map(|t| t.status.clone())
    }

    /// Wait for the latest job of `user_id` to finish and return its status.
    pub async fn wait(&self, user_id: Uuid) -> Option<RefreshStatus> {
        let handle = self.state.lock().await.handles.remove(&user_id);
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::error!(%user_id, error = %e, "Refresh supervisor failed");
        }
        self.status(user_id).await
    }
}

impl std::fmt::Debug for RefreshRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRunner").finish_non_exhaustive()
    }
}

async fn record(state: &Mutex<RunnerState>, user_id: Uuid, job: u64, status: RefreshStatus) {
    state.lock().await.set_status(user_id, job, status);
}

/// Record the final status and drop the supervisor handle, unless a newer
/// job owns both by now.
async fn complete(state: &Mutex<RunnerState>, user_id: Uuid, job: u64, status: RefreshStatus) {
    let mut state = state.lock().await;
    if state.set_status(user_id, job, status) {
        state.handles.remove(&user_id);
    }
}

fn finished(outcome: RefreshOutcome) -> RefreshStatus {
    if outcome.is_success() {
        RefreshStatus::Succeeded { outcome }
    } else {
        RefreshStatus::Failed {
            reason: outcome.to_string(),
        }
    }
}

fn join_failure(e: JoinError) -> String {
    if e.is_panic() {
        let payload = e.into_panic();
        if let Some(s) = payload.downcast_ref::<&str>() {
            format!("panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panicked: {s}")
        } else {
            "panicked".to_string()
        }
    } else if e.is_cancelled() {
        "cancelled".to_string()
    } else {
        format!("task failed: {e}")
    }
}
