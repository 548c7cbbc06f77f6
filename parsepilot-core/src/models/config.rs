//! Extraction config types.
//!
//! - [`ConfigData`] - the recipe itself: container selector, fields, pagination
//! - [`ParserConfig`] - a persisted recipe as the backend stores it
//! - [`Pagination`] / [`PaginationType`] - how the scraper advances pages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::structure::FieldSpec;

// ============================================================================
// Config Data
// ============================================================================

/// A save-ready extraction recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Selector locating the repeating container.
    pub container_selector: String,
    /// Fields to extract from each matched block, in display/save order.
    pub fields: Vec<FieldSpec>,
    /// Pagination strategy; absent means single-page extraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Pagination strategy for multi-page extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// How the scraper advances to the next page.
    #[serde(rename = "type")]
    pub pagination_type: PaginationType,
    /// Selector of the next-page control, for [`PaginationType::NextButton`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// URL template with a `{page}` placeholder, for [`PaginationType::UrlPattern`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_template: Option<String>,
}

/// How the scraper advances from page to page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationType {
    /// Click a next-page control.
    NextButton,
    /// Scroll to trigger incremental loading.
    Scroll,
    /// Substitute page numbers into a URL template.
    UrlPattern,
}

// ============================================================================
// Parser Config
// ============================================================================

/// A persisted extraction recipe, as returned by the backend.
///
/// Created once via save and immutable from the client's perspective; the
/// client never caches or mutates these beyond read-through projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Backend-assigned id.
    pub id: u32,
    /// Host the recipe applies to, derived from the analyzed page's URL.
    pub domain: String,
    /// URL template with a `{page}` placeholder for pagination.
    #[serde(default)]
    pub url_pattern: Option<String>,
    /// The extraction recipe itself.
    pub config: ConfigData,
    /// When the recipe was saved.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last touched server-side, if ever.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning user, when the backend runs multi-tenant.
    #[serde(default)]
    pub user_id: Option<u32>,
}

impl ParserConfig {
    /// Start URL prefilled from the pattern: `{page}` replaced with `1`.
    ///
    /// Returns `None` when no pattern is stored.
    pub fn first_page_url(&self) -> Option<String> {
        self.url_pattern
            .as_ref()
            .map(|pattern| pattern.replace("{page}", "1"))
    }
}
