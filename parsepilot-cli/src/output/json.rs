//! JSON output formatting.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use parsepilot_client::ExportPayload;
use parsepilot_core::{Candidate, FieldSpec, FieldType, ParserConfig, ScrapeResult, SessionId, TaskId};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a finished analysis.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    pub task_id: String,
    pub session_id: String,
    pub candidates: Vec<CandidateOutput>,
}

/// One container candidate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateOutput {
    pub id: u32,
    pub selector: String,
    pub count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub example_items: Vec<String>,
}

/// One saved config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOutput {
    pub id: u32,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    pub container_selector: String,
    pub fields: Vec<FieldOutput>,
    pub created_at: DateTime<Utc>,
}

/// One extraction field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutput {
    pub name: String,
    pub selector: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

/// A finished scrape run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOutput {
    pub task_id: String,
    pub total_items: u64,
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// A written export file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    pub task_id: String,
    pub path: String,
    pub bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats an analysis outcome.
    pub fn format_analysis(
        &self,
        task_id: &TaskId,
        session_id: &SessionId,
        candidates: &[Candidate],
    ) -> Result<String> {
        let output = AnalysisOutput {
            task_id: task_id.to_string(),
            session_id: session_id.to_string(),
            candidates: candidates.iter().map(candidate_to_output).collect(),
        };
        self.format(&output)
    }

    /// Formats one saved config.
    pub fn format_config(&self, config: &ParserConfig) -> Result<String> {
        self.format(&config_to_output(config))
    }

    /// Formats a config listing.
    pub fn format_configs(&self, configs: &[ParserConfig]) -> Result<String> {
        let outputs: Vec<ConfigOutput> = configs.iter().map(config_to_output).collect();
        self.format(&outputs)
    }

    /// Formats a scrape result.
    pub fn format_result(&self, result: &ScrapeResult) -> Result<String> {
        let output = ResultOutput {
            task_id: result.task_id.to_string(),
            total_items: result.total_items,
            data: result.data.clone(),
        };
        self.format(&output)
    }

    /// Formats a written export file.
    pub fn format_export(
        &self,
        task_id: &TaskId,
        path: &Path,
        payload: &ExportPayload,
    ) -> Result<String> {
        let output = ExportOutput {
            task_id: task_id.to_string(),
            path: path.display().to_string(),
            bytes: payload.bytes.len(),
            content_type: payload.content_type.clone(),
        };
        self.format(&output)
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn candidate_to_output(candidate: &Candidate) -> CandidateOutput {
    CandidateOutput {
        id: candidate.id,
        selector: candidate.container_selector.clone(),
        count: candidate.count,
        example_items: candidate.example_items.clone(),
    }
}

fn config_to_output(config: &ParserConfig) -> ConfigOutput {
    ConfigOutput {
        id: config.id,
        domain: config.domain.clone(),
        url_pattern: config.url_pattern.clone(),
        container_selector: config.config.container_selector.clone(),
        fields: config.config.fields.iter().map(field_to_output).collect(),
        created_at: config.created_at,
    }
}

fn field_to_output(field: &FieldSpec) -> FieldOutput {
    FieldOutput {
        name: field.name.clone(),
        selector: field.selector.clone(),
        field_type: field.field_type,
        attribute: field.attribute.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================
