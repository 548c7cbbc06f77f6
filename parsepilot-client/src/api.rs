//! Typed client for the backend REST contract.
//!
//! One method per backend endpoint, request envelopes local to this module,
//! and responses decoded straight into the core wire models. All calls go
//! through [`HttpClient`] and map failures into [`ApiError`]; non-success
//! statuses surface the backend's `detail` message when one is present.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument, warn};
use url::Url;

use parsepilot_core::{
    AnalysisStatus, Candidate, ConfigData, FieldSpec, ParserConfig, ScrapeResult, ScrapeStatus,
    SessionId, TaskId, TaskRef,
};

use crate::error::ApiError;
use crate::http::HttpClient;

// ============================================================================
// Endpoints
// ============================================================================

const ANALYZE_START: &str = "analyze/start";
const ANALYZE_STATUS: &str = "analyze/status";
const ANALYZE_CANDIDATES: &str = "analyze/candidates";
const ANALYZE_SELECT_CONTAINER: &str = "analyze/select-container";
const ANALYZE_FIELDS: &str = "analyze/fields";
const CONFIGS: &str = "configs/";
const CONFIGS_BY_DOMAIN: &str = "configs/by-domain";
const SCRAPE_START: &str = "scrape/start";
const SCRAPE_STATUS: &str = "scrape/status";
const SCRAPE_RESULT: &str = "scrape/result";
const SCRAPE_EXPORT: &str = "scrape/export";

// ============================================================================
// Request/Response Envelopes
// ============================================================================

/// Body of `POST /analyze/start`.
#[derive(Debug, Serialize)]
struct StartAnalysisRequest<'a> {
    url: &'a str,
    use_js: bool,
}

/// Body of `POST /analyze/select-container`.
#[derive(Debug, Serialize)]
struct SelectContainerRequest<'a> {
    session_id: &'a SessionId,
    container_selector: &'a str,
}

/// Body of `POST /configs/`.
#[derive(Debug, Serialize)]
pub struct CreateConfigRequest {
    /// Host the recipe applies to.
    pub domain: String,
    /// Optional URL template with a `{page}` placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    /// The extraction recipe.
    pub config: ConfigData,
}

/// Body of `POST /scrape/start`.
#[derive(Debug, Serialize)]
struct StartScrapeRequest<'a> {
    config_id: u32,
    start_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_pages: Option<u32>,
}

/// Envelope of `GET /analyze/candidates/{session_id}`.
#[derive(Debug, Deserialize)]
struct CandidatesResponse {
    #[allow(dead_code)]
    session_id: SessionId,
    candidates: Vec<Candidate>,
}

/// Envelope of `GET /analyze/fields/{session_id}`.
#[derive(Debug, Deserialize)]
struct FieldsResponse {
    #[allow(dead_code)]
    session_id: SessionId,
    fields: Vec<FieldSpec>,
}

/// Error body the backend attaches to non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

// ============================================================================
// Export
// ============================================================================

/// File format of a result export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain JSON file.
    Json,
    /// Excel workbook.
    Excel,
}

impl ExportFormat {
    /// The `format` query value the backend expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Excel => "excel",
        }
    }

    /// Conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Excel => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "excel" => Ok(Self::Excel),
            other => Err(format!("unknown export format: {other} (expected json or excel)")),
        }
    }
}

/// Raw export download: the file body plus its reported content type.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    /// File contents.
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, when the backend sent one.
    pub content_type: Option<String>,
}

// ============================================================================
// API Client
// ============================================================================

/// Typed client for the backend REST contract.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the given backend base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
        }
    }

    /// Creates a client with a custom [`HttpClient`].
    pub fn with_http(base_url: Url, http: HttpClient) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    /// Starts a page analysis task.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn start_analysis(&self, url: &str, use_js: bool) -> Result<TaskId, ApiError> {
        debug!("Starting analysis");

        let response = self
            .http
            .post_json(
                &self.endpoint(ANALYZE_START),
                &StartAnalysisRequest { url, use_js },
            )
            .await?;
        let started: TaskRef = read_json(response).await?;
        Ok(started.task_id)
    }

    /// Fetches the status of an analysis task.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn analysis_status(&self, task_id: &TaskId) -> Result<AnalysisStatus, ApiError> {
        let url = format!("{}/{}", self.endpoint(ANALYZE_STATUS), task_id);
        let response = self.http.get(&url).await?;
        read_json(response).await
    }

    /// Fetches the candidate set for a session.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn candidates(&self, session_id: &SessionId) -> Result<Vec<Candidate>, ApiError> {
        let url = format!("{}/{}", self.endpoint(ANALYZE_CANDIDATES), session_id);
        let response = self.http.get(&url).await?;
        let envelope: CandidatesResponse = read_json(response).await?;
        Ok(envelope.candidates)
    }

    /// Tells the backend which container the user chose.
    #[instrument(skip(self), fields(session_id = %session_id, selector = %container_selector))]
    pub async fn select_container(
        &self,
        session_id: &SessionId,
        container_selector: &str,
    ) -> Result<(), ApiError> {
        debug!("Selecting container");

        let response = self
            .http
            .post_json(
                &self.endpoint(ANALYZE_SELECT_CONTAINER),
                &SelectContainerRequest {
                    session_id,
                    container_selector,
                },
            )
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Fetches the field set for a session's chosen container.
    #[instrument(skip(self), fields(session_id = %session_id))]
    pub async fn fields(&self, session_id: &SessionId) -> Result<Vec<FieldSpec>, ApiError> {
        let url = format!("{}/{}", self.endpoint(ANALYZE_FIELDS), session_id);
        let response = self.http.get(&url).await?;
        let envelope: FieldsResponse = read_json(response).await?;
        Ok(envelope.fields)
    }

    // ------------------------------------------------------------------
    // Configs
    // ------------------------------------------------------------------

    /// Persists an extraction config.
    #[instrument(skip(self, request), fields(domain = %request.domain))]
    pub async fn create_config(
        &self,
        request: &CreateConfigRequest,
    ) -> Result<ParserConfig, ApiError> {
        debug!("Creating config");

        let response = self
            .http
            .post_json(&self.endpoint(CONFIGS), request)
            .await?;
        read_json(response).await
    }

    /// Lists all saved configs.
    #[instrument(skip(self))]
    pub async fn configs(&self) -> Result<Vec<ParserConfig>, ApiError> {
        let response = self.http.get(&self.endpoint(CONFIGS)).await?;
        read_json(response).await
    }

    /// Lists saved configs for one domain.
    #[instrument(skip(self))]
    pub async fn configs_by_domain(&self, domain: &str) -> Result<Vec<ParserConfig>, ApiError> {
        let response = self
            .http
            .get_with_query(&self.endpoint(CONFIGS_BY_DOMAIN), &[("domain", domain)])
            .await?;
        read_json(response).await
    }

    /// Fetches one saved config by id.
    #[instrument(skip(self))]
    pub async fn config(&self, id: u32) -> Result<ParserConfig, ApiError> {
        let url = format!("{}{}", self.endpoint(CONFIGS), id);
        let response = self.http.get(&url).await?;
        read_json(response).await
    }

    // ------------------------------------------------------------------
    // Scrape
    // ------------------------------------------------------------------

    /// Starts an extraction run for a saved config.
    #[instrument(skip(self))]
    pub async fn start_scrape(
        &self,
        config_id: u32,
        start_url: &str,
        max_pages: Option<u32>,
    ) -> Result<TaskId, ApiError> {
        debug!("Starting scrape");

        let response = self
            .http
            .post_json(
                &self.endpoint(SCRAPE_START),
                &StartScrapeRequest {
                    config_id,
                    start_url,
                    max_pages,
                },
            )
            .await?;
        let started: TaskRef = read_json(response).await?;
        Ok(started.task_id)
    }

    /// Fetches the status of an extraction run.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn scrape_status(&self, task_id: &TaskId) -> Result<ScrapeStatus, ApiError> {
        let url = format!("{}/{}", self.endpoint(SCRAPE_STATUS), task_id);
        let response = self.http.get(&url).await?;
        read_json(response).await
    }

    /// Fetches the result of a finished extraction run.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub async fn scrape_result(&self, task_id: &TaskId) -> Result<ScrapeResult, ApiError> {
        let url = format!("{}/{}", self.endpoint(SCRAPE_RESULT), task_id);
        let response = self.http.get(&url).await?;
        read_json(response).await
    }

    /// Downloads an export of a finished run in the given format.
    #[instrument(skip(self), fields(task_id = %task_id, format = %format))]
    pub async fn export(
        &self,
        task_id: &TaskId,
        format: ExportFormat,
    ) -> Result<ExportPayload, ApiError> {
        debug!("Downloading export");

        let url = format!("{}/{}", self.endpoint(SCRAPE_EXPORT), task_id);
        let response = self
            .http
            .get_with_query(&url, &[("format", format.as_str())])
            .await?;
        let response = ensure_success(response).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        Ok(ExportPayload {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

// ============================================================================
// Response Handling
// ============================================================================

/// Rejects non-success responses, surfacing the backend's `detail` message.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .map(|parsed| parsed.detail)
            .unwrap_or(fallback),
        Err(_) => fallback,
    };
    warn!(status = status.as_u16(), message = %message, "Backend returned error");

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Reads a success response body as JSON.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    let parsed = serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, "Failed to parse response body");
        ApiError::Json(e)
    })?;
    Ok(parsed)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = ApiClient::new(Url::parse("http://localhost:8000/").unwrap());
        assert_eq!(
            client.endpoint(ANALYZE_START),
            "http://localhost:8000/analyze/start"
        );

        let client = ApiClient::new(Url::parse("http://localhost:8000/api").unwrap());
        assert_eq!(
            client.endpoint(ANALYZE_START),
            "http://localhost:8000/api/analyze/start"
        );
    }

    #[test]
    fn test_create_config_request_omits_absent_pattern() {
        let request = CreateConfigRequest {
            domain: "shop.example".to_string(),
            url_pattern: None,
            config: ConfigData {
                container_selector: "div.card".to_string(),
                fields: vec![],
                pagination: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("url_pattern").is_none());
        assert_eq!(json["domain"], "shop.example");
    }

    #[test]
    fn test_start_scrape_request_shape() {
        let request = StartScrapeRequest {
            config_id: 7,
            start_url: "https://shop.example/catalog?page=1",
            max_pages: Some(3),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["config_id"], 7);
        assert_eq!(json["max_pages"], 3);

        let request = StartScrapeRequest {
            config_id: 7,
            start_url: "https://shop.example/catalog?page=1",
            max_pages: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_pages").is_none());
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("csv".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Excel.extension(), "xlsx");
    }

    #[test]
    fn test_error_body_parsing() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Task not found"}"#).unwrap();
        assert_eq!(body.detail, "Task not found");
    }
}
