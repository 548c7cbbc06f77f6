//! Generic task poller.
//!
//! Turns a backend's asynchronous task into a single terminal outcome by
//! querying its status at a fixed interval:
//!
//! - [`PollTarget`] - the status-fetch seam, implemented per subsystem
//! - [`PollState`] - classification of one status response
//! - [`TaskPoller`] - the loop: sequential queries, cancellation, one outcome
//!
//! Guarantees: at most one query is in flight at a time, queries are strictly
//! sequential, exactly one terminal outcome is produced per run, and a
//! cancelled poll delivers nothing even when a query was already in flight.
//! A transport failure ends the poll after that single failed query.

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use parsepilot_core::TaskId;

use crate::error::{ApiError, PollError};

/// Default interval between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

// ============================================================================
// Poll Target
// ============================================================================

/// Classification of one status response.
#[derive(Debug, Clone)]
pub enum PollState<T, P> {
    /// Task still running; an optional progress payload may accompany it.
    InProgress(Option<P>),
    /// Task finished successfully with its terminal payload.
    Succeeded(T),
    /// Task finished in failure with the backend's error message.
    Failed(String),
}

/// The status-fetch seam the poller drives.
///
/// Implementations wrap one backend subsystem's status endpoint and classify
/// each response as in-progress, terminal-success, or terminal-failure.
#[async_trait]
pub trait PollTarget: Send + Sync {
    /// Terminal payload on success.
    type Output: Send;
    /// Progress payload carried by in-progress responses.
    type Progress: Send;

    /// The task being polled, for logging.
    fn task_id(&self) -> &TaskId;

    /// Queries the task's status once and classifies the response.
    async fn fetch_status(&self) -> Result<PollState<Self::Output, Self::Progress>, ApiError>;
}

// ============================================================================
// Poll Settings
// ============================================================================

/// Timing configuration for a poll run.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Fixed interval between status queries.
    pub interval: Duration,
    /// Optional liveness cap: maximum number of queries before giving up.
    /// `None` polls until the task reaches a terminal state.
    pub max_attempts: Option<u32>,
}

impl PollSettings {
    /// Creates settings with the given interval and no attempt bound.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Sets the attempt bound.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

// ============================================================================
// Task Poller
// ============================================================================

/// Drives a [`PollTarget`] to a single terminal outcome.
///
/// Each poller owns its cancellation token; dropping the poller cancels any
/// run still in flight, so a poller scoped to a workflow stage cannot leak
/// queries past the stage's lifetime.
#[derive(Debug)]
pub struct TaskPoller {
    settings: PollSettings,
    cancel: CancellationToken,
}

impl TaskPoller {
    /// Creates a poller with the given settings.
    pub fn new(settings: PollSettings) -> Self {
        Self {
            settings,
            cancel: CancellationToken::new(),
        }
    }

    /// A handle that cancels this poller's run when triggered.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels the run. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Polls the target until it reaches a terminal state.
    ///
    /// In-progress payloads are forwarded to `on_progress` as they arrive.
    /// The first status query happens one interval after the call, never
    /// immediately.
    ///
    /// # Errors
    ///
    /// [`PollError::Transport`] after a single failed status query,
    /// [`PollError::TaskFailed`] when the backend reports terminal failure,
    /// [`PollError::Cancelled`] when the poller is cancelled first, and
    /// [`PollError::AttemptsExhausted`] when a configured attempt bound is
    /// reached while still in progress.
    #[instrument(skip(self, target, on_progress), fields(task_id = %target.task_id()))]
    pub async fn run<T: PollTarget>(
        &self,
        target: &T,
        mut on_progress: impl FnMut(T::Progress) + Send,
    ) -> Result<T::Output, PollError> {
        let mut attempts: u32 = 0;

        loop {
            // Cancellation wins over an elapsed interval and over an
            // in-flight query; a response that races the cancel is dropped
            // unread.
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!(attempts, "Poll cancelled while waiting");
                    return Err(PollError::Cancelled);
                }
                () = tokio::time::sleep(self.settings.interval) => {}
            }

            attempts += 1;
            let state = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!(attempts, "Poll cancelled with query in flight");
                    return Err(PollError::Cancelled);
                }
                result = target.fetch_status() => result?,
            };

            match state {
                PollState::Succeeded(output) => {
                    debug!(attempts, "Task reached terminal success");
                    return Ok(output);
                }
                PollState::Failed(message) => {
                    debug!(attempts, message = %message, "Task reached terminal failure");
                    return Err(PollError::TaskFailed(message));
                }
                PollState::InProgress(progress) => {
                    debug!(attempts, "Task still in progress");
                    if let Some(progress) = progress {
                        on_progress(progress);
                    }
                    if let Some(max) = self.settings.max_attempts {
                        if attempts >= max {
                            return Err(PollError::AttemptsExhausted { attempts });
                        }
                    }
                }
            }
        }
    }
}

impl Drop for TaskPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================
