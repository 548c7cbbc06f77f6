//! Domain models for ParsePilot.
//!
//! This module contains the data structures exchanged with the scraping
//! backend. Field names and enum spellings follow the backend's JSON wire
//! format exactly, so every type here derives its serde layout rather than
//! relying on conversion shims.
//!
//! ## Submodules
//!
//! - [`task`] - Task identifiers and polling payloads (AnalysisStatus, ScrapeStatus)
//! - [`structure`] - Analysis output (Candidate, FieldSpec, FieldType)
//! - [`config`] - Extraction configs (ConfigData, ParserConfig, Pagination)
//! - [`scrape`] - Scrape results (ScrapeResult)

mod config;
mod scrape;
mod structure;
mod task;

// Re-export everything at the models level
pub use config::{ConfigData, Pagination, PaginationType, ParserConfig};
pub use scrape::ScrapeResult;
pub use structure::{Candidate, FieldSpec, FieldType};
pub use task::{AnalysisState, AnalysisStatus, ScrapeState, ScrapeStatus, SessionId, TaskId, TaskRef};
