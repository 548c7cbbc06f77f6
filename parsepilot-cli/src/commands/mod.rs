//! CLI command implementations.

pub mod analyze;
pub mod config;
pub mod configs;
pub mod export;
pub mod scrape;
pub mod wizard;
