//! Session state: one analyze-to-scrape workflow instance.
//!
//! A [`Session`] is the explicit state object the workflow threads through
//! every operation. It owns everything accumulated along the way (candidates,
//! fields, the user's overlay, the saved config, the final result) and
//! enforces the stage machine:
//!
//! ```text
//! AnalyzePending -> CandidateSelection -> FieldSelection
//!     -> ConfigSaved -> ScrapeRunning -> ResultsReady
//! ```
//!
//! Transitions are monotonic forward; [`Stage::Failed`] is reachable from any
//! non-terminal stage and is itself terminal. All mutation goes through the
//! event methods below, which reject out-of-order transitions with
//! [`CoreError::InvalidTransition`].

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::models::{
    Candidate, FieldSpec, ParserConfig, ScrapeResult, SessionId, TaskId,
};
use crate::reconcile::{FieldEdit, FieldOverlay};

// ============================================================================
// Stage
// ============================================================================

/// Where a session currently stands in the wizard flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Analysis started; waiting for the backend task to finish.
    AnalyzePending,
    /// Candidates received; waiting for the user to pick one.
    CandidateSelection,
    /// Fields received; the user is editing the selection overlay.
    FieldSelection,
    /// Config persisted; a scrape run can be started.
    ConfigSaved,
    /// Scrape started; waiting for the backend task to finish.
    ScrapeRunning,
    /// Result stored; retrieval and export are available.
    ResultsReady,
    /// A fatal error ended the session.
    Failed,
}

impl Stage {
    /// Returns true once the session will never change stage again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResultsReady | Self::Failed)
    }

    /// The stage that follows this one in the forward order, if any.
    pub fn successor(&self) -> Option<Stage> {
        match self {
            Self::AnalyzePending => Some(Self::CandidateSelection),
            Self::CandidateSelection => Some(Self::FieldSelection),
            Self::FieldSelection => Some(Self::ConfigSaved),
            Self::ConfigSaved => Some(Self::ScrapeRunning),
            Self::ScrapeRunning => Some(Self::ResultsReady),
            Self::ResultsReady | Self::Failed => None,
        }
    }

    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AnalyzePending => "Analyzing",
            Self::CandidateSelection => "Candidate selection",
            Self::FieldSelection => "Field selection",
            Self::ConfigSaved => "Config saved",
            Self::ScrapeRunning => "Scrape running",
            Self::ResultsReady => "Results ready",
            Self::Failed => "Failed",
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// One end-to-end analysis/extraction attempt.
///
/// Created when analysis starts; lives for the duration of the workflow and
/// is never persisted. The source URL is immutable once set, and the session
/// id is assigned exactly once, when the analysis task succeeds.
#[derive(Debug, Clone)]
pub struct Session {
    source_url: Url,
    stage: Stage,
    session_id: Option<SessionId>,
    analysis_task: TaskId,
    candidates: Vec<Candidate>,
    chosen_selector: Option<String>,
    fields: Vec<FieldSpec>,
    overlay: FieldOverlay,
    saved_config: Option<ParserConfig>,
    scrape_task: Option<TaskId>,
    result: Option<ScrapeResult>,
    error: Option<String>,
}

impl Session {
    /// Creates a session for a just-started analysis task.
    pub fn new(source_url: Url, analysis_task: TaskId) -> Self {
        Self {
            source_url,
            stage: Stage::AnalyzePending,
            session_id: None,
            analysis_task,
            candidates: Vec::new(),
            chosen_selector: None,
            fields: Vec::new(),
            overlay: FieldOverlay::new(),
            saved_config: None,
            scrape_task: None,
            result: None,
            error: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The page URL under analysis.
    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Backend session id; `None` until analysis succeeds.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// The analysis task driving this session.
    pub fn analysis_task(&self) -> &TaskId {
        &self.analysis_task
    }

    /// Candidates received from analysis, in server order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Container selector of the chosen candidate.
    pub fn chosen_selector(&self) -> Option<&str> {
        self.chosen_selector.as_deref()
    }

    /// Fields received for the chosen container, in server order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// The user's edit overlay.
    pub fn overlay(&self) -> &FieldOverlay {
        &self.overlay
    }

    /// The persisted config, once saved.
    pub fn saved_config(&self) -> Option<&ParserConfig> {
        self.saved_config.as_ref()
    }

    /// The scrape task, once a run has started.
    pub fn scrape_task(&self) -> Option<&TaskId> {
        self.scrape_task.as_ref()
    }

    /// The scrape result, once ready.
    pub fn result(&self) -> Option<&ScrapeResult> {
        self.result.as_ref()
    }

    /// Error message; present only in [`Stage::Failed`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Host of the source URL, used as the config's domain.
    pub fn domain(&self) -> Result<&str, CoreError> {
        self.source_url.host_str().ok_or_else(|| {
            CoreError::Validation(format!("source URL has no host: {}", self.source_url))
        })
    }

    // ------------------------------------------------------------------
    // Stage events
    // ------------------------------------------------------------------

    fn advance(&mut self, to: Stage) -> Result<(), CoreError> {
        if self.stage.successor() == Some(to) {
            self.stage = to;
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                from: self.stage,
                to,
            })
        }
    }

    /// Analysis task finished successfully: store the server-assigned session
    /// id and the candidate set, and move to candidate selection.
    pub fn analysis_succeeded(
        &mut self,
        session_id: SessionId,
        candidates: Vec<Candidate>,
    ) -> Result<(), CoreError> {
        self.advance(Stage::CandidateSelection)?;
        self.session_id = Some(session_id);
        self.candidates = candidates;
        Ok(())
    }

    /// Container chosen and its fields received: move to field selection.
    pub fn fields_received(
        &mut self,
        chosen_selector: String,
        fields: Vec<FieldSpec>,
    ) -> Result<(), CoreError> {
        self.advance(Stage::FieldSelection)?;
        self.chosen_selector = Some(chosen_selector);
        self.fields = fields;
        Ok(())
    }

    /// Config persisted by the backend: move to config-saved.
    pub fn config_saved(&mut self, config: ParserConfig) -> Result<(), CoreError> {
        self.advance(Stage::ConfigSaved)?;
        self.saved_config = Some(config);
        Ok(())
    }

    /// Scrape run started: move to scrape-running.
    pub fn scrape_started(&mut self, task_id: TaskId) -> Result<(), CoreError> {
        self.advance(Stage::ScrapeRunning)?;
        self.scrape_task = Some(task_id);
        Ok(())
    }

    /// Scrape result stored: move to results-ready.
    pub fn results_ready(&mut self, result: ScrapeResult) -> Result<(), CoreError> {
        self.advance(Stage::ResultsReady)?;
        self.result = Some(result);
        Ok(())
    }

    /// A fatal error ends the session. Already-accumulated data stays
    /// readable so the failure can be presented with context.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        if self.stage.is_terminal() {
            return Err(CoreError::InvalidTransition {
                from: self.stage,
                to: Stage::Failed,
            });
        }
        self.stage = Stage::Failed;
        self.error = Some(message.into());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Overlay edits
    // ------------------------------------------------------------------

    fn overlay_entry(&mut self, selector: &str) -> Result<&mut FieldEdit, CoreError> {
        if self.stage != Stage::FieldSelection {
            return Err(CoreError::Validation(format!(
                "fields can only be edited during field selection (stage is {:?})",
                self.stage
            )));
        }
        Ok(self.overlay.entry_mut(selector))
    }

    /// Includes or excludes a field, keyed by its original selector.
    pub fn set_field_included(&mut self, selector: &str, included: bool) -> Result<(), CoreError> {
        self.overlay_entry(selector)?.included = included;
        Ok(())
    }

    /// Overrides a field's display name, keyed by its original selector.
    pub fn rename_field(&mut self, selector: &str, name: impl Into<String>) -> Result<(), CoreError> {
        self.overlay_entry(selector)?.name = Some(name.into());
        Ok(())
    }

    /// Overrides a field's selector, keyed by its original selector.
    pub fn override_field_selector(
        &mut self,
        selector: &str,
        new_selector: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.overlay_entry(selector)?.selector = Some(new_selector.into());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
