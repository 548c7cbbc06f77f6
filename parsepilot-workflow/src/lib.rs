// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ParsePilot` Workflow
//!
//! Orchestration of the wizard flow: this crate ties the core state model and
//! the backend client together into a single driver that starts an analysis,
//! waits for it, picks a candidate, tunes the field selection, saves the
//! config, runs the scrape, and collects the result.
//!
//! ## Key Types
//!
//! - [`Workflow`] - drives one [`parsepilot_core::Session`] through its stages
//! - [`WorkflowError`] - transport and task failures (fatal) alongside
//!   selection and validation errors (recoverable)

pub mod controller;
pub mod error;

pub use controller::Workflow;
pub use error::WorkflowError;
