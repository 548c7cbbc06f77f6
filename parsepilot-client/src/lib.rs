// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ParsePilot` Client
//!
//! REST client and task poller for the `ParsePilot` backend.
//!
//! This crate covers everything between the workflow and the wire:
//!
//! ## API Client
//!
//! - [`ApiClient`] - one typed method per backend endpoint
//! - [`HttpClient`] - traced HTTP wrapper all calls go through
//! - [`ExportFormat`] / [`ExportPayload`] - result export downloads
//!
//! ## Task Poller
//!
//! The poller turns an asynchronous backend task into a single terminal
//! outcome:
//!
//! - [`TaskPoller`] - the loop: fixed interval, sequential queries, cancellation
//! - [`PollTarget`] - status-fetch seam, implemented per subsystem
//! - [`AnalysisPoll`] / [`ScrapePoll`] - targets for the two subsystems
//!
//! ## Example
//!
//! ```ignore
//! use parsepilot_client::{AnalysisPoll, ApiClient, PollSettings, TaskPoller};
//!
//! let api = ApiClient::new("http://localhost:8000".parse()?);
//! let task_id = api.start_analysis("https://shop.example/catalog", true).await?;
//!
//! let poller = TaskPoller::new(PollSettings::default());
//! let status = poller.run(&AnalysisPoll::new(&api, task_id), |_| {}).await?;
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod poller;
pub mod targets;

// Re-export key types at crate root

// Errors
pub use error::{ApiError, PollError};

// API client
pub use api::{ApiClient, CreateConfigRequest, ExportFormat, ExportPayload};
pub use http::HttpClient;

// Poller
pub use poller::{PollSettings, PollState, PollTarget, TaskPoller, DEFAULT_POLL_INTERVAL};
pub use targets::{AnalysisPoll, ScrapePoll, ScrapeProgress};
