// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ParsePilot` Core
//!
//! Core types, session state, and selection reconciliation for the
//! `ParsePilot` client.
//!
//! This crate holds everything that does not touch the network: the wire
//! data model shared with the backend, the session state machine, and the
//! pure reconciliation logic that turns server-provided candidates and
//! fields plus user edits into a save-ready extraction config.
//!
//! ## Key Types
//!
//! ### Task Types
//! - [`TaskId`] - Opaque backend task identifier
//! - [`AnalysisStatus`] / [`AnalysisState`] - Analysis task polling payloads
//! - [`ScrapeStatus`] / [`ScrapeState`] - Scrape task polling payloads
//!
//! ### Structure Types
//! - [`Candidate`] - One structural hypothesis from page analysis
//! - [`FieldSpec`] - One extractable attribute within a container
//! - [`FieldType`] - Kind of value a field yields
//!
//! ### Config Types
//! - [`ConfigData`] - Container selector + fields + optional pagination
//! - [`ParserConfig`] - A persisted extraction recipe
//! - [`Pagination`] / [`PaginationType`] - Pagination strategy
//!
//! ### Session & Reconciliation
//! - [`Session`] / [`Stage`] - One analyze-to-scrape workflow instance
//! - [`FieldOverlay`] / [`FieldEdit`] - Non-destructive user edits
//! - [`reconcile::choose_candidate`] / [`reconcile::build_config`]

pub mod error;
pub mod models;
pub mod reconcile;
pub mod session;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Task types
    AnalysisState,
    AnalysisStatus,
    ScrapeState,
    ScrapeStatus,
    SessionId,
    TaskId,
    TaskRef,
    // Structure types
    Candidate,
    FieldSpec,
    FieldType,
    // Config types
    ConfigData,
    Pagination,
    PaginationType,
    ParserConfig,
    // Result types
    ScrapeResult,
};

// Re-export session state
pub use session::{Session, Stage};

// Re-export reconciliation types
pub use reconcile::{FieldEdit, FieldOverlay};
