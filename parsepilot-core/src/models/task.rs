//! Task identifiers and polling payloads.
//!
//! Both backend subsystems (analysis and scrape) hand out an opaque task id
//! on start and expose a status endpoint for it. The status payloads here
//! mirror those endpoints:
//! - [`AnalysisStatus`] / [`AnalysisState`] - page analysis tasks
//! - [`ScrapeStatus`] / [`ScrapeState`] - extraction runs

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque identifier for a backend task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Opaque identifier for an analysis session, assigned by the backend once
/// analysis succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Response body of the task-start endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    /// Identifier of the task that was started.
    pub task_id: TaskId,
}

// ============================================================================
// Analysis Task Status
// ============================================================================

/// Lifecycle state of a page analysis task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnalysisState {
    /// Queued or running.
    Pending,
    /// Finished; candidates are available under the reported session id.
    Success,
    /// Finished with an error.
    Failure,
}

impl AnalysisState {
    /// Returns true once the task will never change state again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Status payload for an analysis task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisStatus {
    /// Task this status belongs to.
    pub task_id: TaskId,
    /// Current lifecycle state.
    pub status: AnalysisState,
    /// Session id, present once `status` is [`AnalysisState::Success`].
    #[serde(default)]
    pub session_id: Option<SessionId>,
    /// Error message, present once `status` is [`AnalysisState::Failure`].
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Scrape Task Status
// ============================================================================

/// Lifecycle state of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScrapeState {
    /// Queued, not yet picked up.
    Pending,
    /// Actively crawling pages.
    Processing,
    /// Finished; the result can be fetched.
    Success,
    /// Finished with an error.
    Failure,
}

impl ScrapeState {
    /// Returns true once the task will never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

/// Status payload for an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeStatus {
    /// Task this status belongs to.
    pub task_id: TaskId,
    /// Current lifecycle state.
    pub status: ScrapeState,
    /// Pages crawled so far; reported while running and on success.
    #[serde(default)]
    pub pages_processed: Option<u32>,
    /// Items extracted so far; reported while running and on success.
    #[serde(default)]
    pub items_count: Option<u32>,
    /// Error message, present once `status` is [`ScrapeState::Failure`].
    #[serde(default)]
    pub error: Option<String>,
}
