//! Scrape result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::task::TaskId;

/// Final output of a successful extraction run.
///
/// Each record maps field names to extracted values. The record sequence
/// keeps the order in which the scraper produced them; key order within a
/// record carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// Task that produced this result.
    pub task_id: TaskId,
    /// Extracted records in production order.
    pub data: Vec<Map<String, Value>>,
    /// Total item count as reported by the backend.
    pub total_items: u64,
}

impl ScrapeResult {
    /// Returns true when the run produced no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
