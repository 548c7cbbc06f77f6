//! Poll targets for the two backend subsystems.
//!
//! [`AnalysisPoll`] and [`ScrapePoll`] adapt the status endpoints to the
//! [`PollTarget`] seam, classifying each payload as in-progress or terminal.
//! Classification itself is kept in plain functions so it can be tested
//! without a backend.

use async_trait::async_trait;

use parsepilot_core::{AnalysisState, AnalysisStatus, ScrapeState, ScrapeStatus, TaskId};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::poller::{PollState, PollTarget};

// ============================================================================
// Analysis
// ============================================================================

/// Polls a page analysis task.
#[derive(Debug)]
pub struct AnalysisPoll<'a> {
    api: &'a ApiClient,
    task_id: TaskId,
}

impl<'a> AnalysisPoll<'a> {
    /// Creates a poll target for an analysis task.
    pub fn new(api: &'a ApiClient, task_id: TaskId) -> Self {
        Self { api, task_id }
    }
}

#[async_trait]
impl PollTarget for AnalysisPoll<'_> {
    type Output = AnalysisStatus;
    type Progress = ();

    fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    async fn fetch_status(&self) -> Result<PollState<AnalysisStatus, ()>, ApiError> {
        let status = self.api.analysis_status(&self.task_id).await?;
        Ok(classify_analysis(status))
    }
}

/// Classifies an analysis status payload.
fn classify_analysis(status: AnalysisStatus) -> PollState<AnalysisStatus, ()> {
    match status.status {
        AnalysisState::Pending => PollState::InProgress(None),
        AnalysisState::Success => PollState::Succeeded(status),
        AnalysisState::Failure => PollState::Failed(
            status
                .error
                .unwrap_or_else(|| "analysis failed without an error message".to_string()),
        ),
    }
}

// ============================================================================
// Scrape
// ============================================================================

/// Progress of a running extraction, forwarded while polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeProgress {
    /// Pages crawled so far.
    pub pages_processed: Option<u32>,
    /// Items extracted so far.
    pub items_count: Option<u32>,
}

/// Polls an extraction run.
#[derive(Debug)]
pub struct ScrapePoll<'a> {
    api: &'a ApiClient,
    task_id: TaskId,
}

impl<'a> ScrapePoll<'a> {
    /// Creates a poll target for an extraction run.
    pub fn new(api: &'a ApiClient, task_id: TaskId) -> Self {
        Self { api, task_id }
    }
}

#[async_trait]
impl PollTarget for ScrapePoll<'_> {
    type Output = ScrapeStatus;
    type Progress = ScrapeProgress;

    fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    async fn fetch_status(&self) -> Result<PollState<ScrapeStatus, ScrapeProgress>, ApiError> {
        let status = self.api.scrape_status(&self.task_id).await?;
        Ok(classify_scrape(status))
    }
}

/// Classifies a scrape status payload.
fn classify_scrape(status: ScrapeStatus) -> PollState<ScrapeStatus, ScrapeProgress> {
    match status.status {
        ScrapeState::Pending | ScrapeState::Processing => {
            let progress = (status.pages_processed.is_some() || status.items_count.is_some())
                .then_some(ScrapeProgress {
                    pages_processed: status.pages_processed,
                    items_count: status.items_count,
                });
            PollState::InProgress(progress)
        }
        ScrapeState::Success => PollState::Succeeded(status),
        ScrapeState::Failure => PollState::Failed(
            status
                .error
                .unwrap_or_else(|| "scrape failed without an error message".to_string()),
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
