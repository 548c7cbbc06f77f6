//! The workflow controller.
//!
//! [`Workflow`] sequences one session through the wizard stages, gating each
//! transition on a successful collaborator call:
//!
//! | From | Operation | To |
//! |---|---|---|
//! | (none) | [`Workflow::start`] | `AnalyzePending` |
//! | `AnalyzePending` | [`Workflow::await_analysis`] | `CandidateSelection` |
//! | `CandidateSelection` | [`Workflow::select_candidate`] | `FieldSelection` |
//! | `FieldSelection` | [`Workflow::save_config`] | `ConfigSaved` |
//! | `ConfigSaved` | [`Workflow::start_scrape`] | `ScrapeRunning` |
//! | `ScrapeRunning` | [`Workflow::await_scrape`] | `ResultsReady` |
//!
//! Transport failures and backend-reported task failures move the session to
//! `Failed` with the message preserved; selection and validation errors leave
//! the stage unchanged so the user can retry with corrected input.
//!
//! Each `await_*` call owns its poller for the duration of the call, so
//! dropping the returned future cancels the poll and discards any in-flight
//! status query. Re-submitting means starting a fresh [`Workflow`]; the old
//! one's poller dies with it.

use tracing::{debug, instrument, warn};
use url::Url;

use parsepilot_client::{
    AnalysisPoll, ApiClient, ApiError, CreateConfigRequest, ExportFormat, ExportPayload,
    PollError, PollSettings, ScrapePoll, ScrapeProgress, TaskPoller,
};
use parsepilot_core::{reconcile, ScrapeResult, Session, SessionId, Stage};

use crate::error::WorkflowError;

// ============================================================================
// Workflow
// ============================================================================

/// Drives one scraping session from analysis to results.
///
/// One instance per session; two sessions are two independent instances
/// sharing no mutable state.
#[derive(Debug)]
pub struct Workflow {
    api: ApiClient,
    settings: PollSettings,
    session: Session,
}

impl Workflow {
    /// Starts analysis for `source_url` and returns a workflow holding the
    /// new session in `AnalyzePending`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Transport`] when the start call fails; no
    /// session exists in that case.
    #[instrument(skip(api, settings), fields(url = %source_url))]
    pub async fn start(
        api: ApiClient,
        settings: PollSettings,
        source_url: Url,
        use_js: bool,
    ) -> Result<Self, WorkflowError> {
        let task_id = api.start_analysis(source_url.as_str(), use_js).await?;
        debug!(task_id = %task_id, "Analysis started");

        let session = Session::new(source_url, task_id);
        Ok(Self {
            api,
            settings,
            session,
        })
    }

    /// The session this workflow drives.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The API client this workflow calls through.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // ------------------------------------------------------------------
    // Stage transitions
    // ------------------------------------------------------------------

    /// Polls the analysis task to terminal, then stores the session id and
    /// candidate set and advances to `CandidateSelection`.
    #[instrument(skip(self), fields(task_id = %self.session.analysis_task()))]
    pub async fn await_analysis(&mut self) -> Result<(), WorkflowError> {
        self.ensure_stage(Stage::AnalyzePending)?;

        let outcome = {
            let target = AnalysisPoll::new(&self.api, self.session.analysis_task().clone());
            let poller = TaskPoller::new(self.settings.clone());
            poller.run(&target, |()| {}).await
        };
        let status = match outcome {
            Ok(status) => status,
            Err(err) => return Err(self.poll_failed(err)),
        };

        let Some(session_id) = status.session_id else {
            return Err(self.fatal(ApiError::InvalidResponse(
                "analysis succeeded without a session id".to_string(),
            )));
        };
        let candidates = match self.api.candidates(&session_id).await {
            Ok(candidates) => candidates,
            Err(err) => return Err(self.fatal(err)),
        };
        debug!(session_id = %session_id, count = candidates.len(), "Candidates received");

        self.session.analysis_succeeded(session_id, candidates)?;
        Ok(())
    }

    /// Resolves the chosen candidate, reports it to the backend, fetches the
    /// fields for it, and advances to `FieldSelection`.
    ///
    /// An unknown id is a recoverable selection error; the stage and the
    /// candidate set are unchanged.
    #[instrument(skip(self))]
    pub async fn select_candidate(&mut self, candidate_id: u32) -> Result<(), WorkflowError> {
        self.ensure_stage(Stage::CandidateSelection)?;

        let selector =
            reconcile::choose_candidate(self.session.candidates(), candidate_id)?.to_string();
        let session_id = self.known_session_id()?;

        if let Err(err) = self.api.select_container(&session_id, &selector).await {
            return Err(self.fatal(err));
        }
        let fields = match self.api.fields(&session_id).await {
            Ok(fields) => fields,
            Err(err) => return Err(self.fatal(err)),
        };
        debug!(selector = %selector, count = fields.len(), "Fields received");

        self.session.fields_received(selector, fields)?;
        Ok(())
    }

    /// Builds the config from the current overlay and persists it, advancing
    /// to `ConfigSaved`.
    ///
    /// An all-excluded overlay or an unusable source URL is recoverable; the
    /// stage and the fetched fields are unchanged.
    #[instrument(skip(self))]
    pub async fn save_config(&mut self, url_pattern: Option<String>) -> Result<(), WorkflowError> {
        self.ensure_stage(Stage::FieldSelection)?;

        let container = self
            .session
            .chosen_selector()
            .ok_or_else(|| {
                WorkflowError::Validation("no container has been chosen".to_string())
            })?
            .to_string();
        let config =
            reconcile::build_config(&container, self.session.fields(), self.session.overlay())?;
        let domain = self.session.domain()?.to_string();
        debug!(domain = %domain, fields = config.fields.len(), "Saving config");

        let request = CreateConfigRequest {
            domain,
            url_pattern,
            config,
        };
        let saved = match self.api.create_config(&request).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fatal(err)),
        };

        self.session.config_saved(saved)?;
        Ok(())
    }

    /// Starts an extraction run for the saved config and advances to
    /// `ScrapeRunning`.
    ///
    /// When `start_url` is omitted it defaults to the config's URL pattern
    /// with `{page}` replaced by `1`; having neither is a recoverable
    /// validation error.
    #[instrument(skip(self))]
    pub async fn start_scrape(
        &mut self,
        start_url: Option<String>,
        max_pages: Option<u32>,
    ) -> Result<(), WorkflowError> {
        self.ensure_stage(Stage::ConfigSaved)?;

        let (config_id, prefill) = {
            let config = self.session.saved_config().ok_or_else(|| {
                WorkflowError::Validation("no config has been saved".to_string())
            })?;
            (config.id, config.first_page_url())
        };
        let start_url = start_url.or(prefill).ok_or_else(|| {
            WorkflowError::Validation(
                "no start URL given and the saved config has no URL pattern".to_string(),
            )
        })?;
        debug!(config_id, start_url = %start_url, "Starting scrape");

        let task_id = match self.api.start_scrape(config_id, &start_url, max_pages).await {
            Ok(task_id) => task_id,
            Err(err) => return Err(self.fatal(err)),
        };

        self.session.scrape_started(task_id)?;
        Ok(())
    }

    /// Polls the scrape task to terminal, fetches the result, and advances to
    /// `ResultsReady`. Progress payloads are forwarded as they arrive.
    ///
    /// When the backend reports terminal failure the session moves to
    /// `Failed` with the reported message and the result is never requested.
    #[instrument(skip(self, on_progress))]
    pub async fn await_scrape(
        &mut self,
        on_progress: impl FnMut(ScrapeProgress) + Send,
    ) -> Result<(), WorkflowError> {
        self.ensure_stage(Stage::ScrapeRunning)?;

        let task_id = self.session.scrape_task().cloned().ok_or_else(|| {
            WorkflowError::Validation("no scrape task is attached to the session".to_string())
        })?;
        let outcome = {
            let target = ScrapePoll::new(&self.api, task_id.clone());
            let poller = TaskPoller::new(self.settings.clone());
            poller.run(&target, on_progress).await
        };
        if let Err(err) = outcome {
            return Err(self.poll_failed(err));
        }

        let result = match self.api.scrape_result(&task_id).await {
            Ok(result) => result,
            Err(err) => return Err(self.fatal(err)),
        };
        debug!(total_items = result.total_items, "Result stored");

        self.session.results_ready(result)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Overlay edits
    // ------------------------------------------------------------------

    /// Includes or excludes a field, keyed by its original selector.
    pub fn set_field_included(
        &mut self,
        selector: &str,
        included: bool,
    ) -> Result<(), WorkflowError> {
        Ok(self.session.set_field_included(selector, included)?)
    }

    /// Overrides a field's display name, keyed by its original selector.
    pub fn rename_field(&mut self, selector: &str, name: &str) -> Result<(), WorkflowError> {
        Ok(self.session.rename_field(selector, name)?)
    }

    /// Overrides a field's selector, keyed by its original selector.
    pub fn override_field_selector(
        &mut self,
        selector: &str,
        new_selector: &str,
    ) -> Result<(), WorkflowError> {
        Ok(self.session.override_field_selector(selector, new_selector)?)
    }

    // ------------------------------------------------------------------
    // Read-only operations after results are ready
    // ------------------------------------------------------------------

    /// The stored scrape result.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::WrongStage`] before `ResultsReady`.
    pub fn result(&self) -> Result<&ScrapeResult, WorkflowError> {
        self.session.result().ok_or(WorkflowError::WrongStage {
            stage: self.session.stage(),
        })
    }

    /// Downloads an export of the finished run. Read-only: the session does
    /// not transition, even on error.
    #[instrument(skip(self))]
    pub async fn export(&self, format: ExportFormat) -> Result<ExportPayload, WorkflowError> {
        self.ensure_stage(Stage::ResultsReady)?;

        let task_id = self.session.scrape_task().ok_or_else(|| {
            WorkflowError::Validation("no scrape task is attached to the session".to_string())
        })?;
        Ok(self.api.export(task_id, format).await?)
    }

    // ------------------------------------------------------------------
    // Failure plumbing
    // ------------------------------------------------------------------

    fn ensure_stage(&self, expected: Stage) -> Result<(), WorkflowError> {
        let stage = self.session.stage();
        if stage == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongStage { stage })
        }
    }

    fn known_session_id(&self) -> Result<SessionId, WorkflowError> {
        self.session
            .session_id()
            .cloned()
            .ok_or_else(|| WorkflowError::Validation("session has no backend id yet".to_string()))
    }

    /// Marks the session failed with the error's message and hands the error
    /// back for propagation.
    fn fatal(&mut self, err: ApiError) -> WorkflowError {
        self.fail_session(&err.to_string());
        WorkflowError::Transport(err)
    }

    fn poll_failed(&mut self, err: PollError) -> WorkflowError {
        match err {
            PollError::Cancelled => WorkflowError::Cancelled,
            PollError::Transport(api_err) => self.fatal(api_err),
            PollError::TaskFailed(message) => {
                self.fail_session(&message);
                WorkflowError::TaskFailure(message)
            }
            PollError::AttemptsExhausted { attempts } => {
                self.fail_session(&format!(
                    "task still in progress after {attempts} status queries"
                ));
                WorkflowError::PollExhausted { attempts }
            }
        }
    }

    fn fail_session(&mut self, message: &str) {
        // Guards keep the session non-terminal on every path that can reach
        // this, so the transition into Failed cannot be rejected.
        if let Err(err) = self.session.fail(message) {
            warn!(error = %err, "Session refused the failure transition");
        }
    }
}
