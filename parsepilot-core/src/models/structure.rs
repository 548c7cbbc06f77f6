//! Analysis output types.
//!
//! Page analysis produces structural hypotheses about the repeating data
//! block on a page:
//! - [`Candidate`] - a container selector plus match count and previews
//! - [`FieldSpec`] - one extractable attribute within the chosen container
//! - [`FieldType`] - the kind of value a field yields

use serde::{Deserialize, Serialize};

// ============================================================================
// Candidate
// ============================================================================

/// One structural hypothesis produced by analysis.
///
/// Candidates are immutable once received; exactly one is chosen per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique id within the session's candidate set.
    pub id: u32,
    /// Selector locating the repeating container on the page.
    pub container_selector: String,
    /// Raw markup snippets of the first few matches, for preview only.
    #[serde(default)]
    pub example_items: Vec<String>,
    /// Number of blocks on the page matching the selector.
    pub count: u32,
}

// ============================================================================
// Field
// ============================================================================

/// One extractable attribute within the chosen container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Display label.
    pub name: String,
    /// Locator relative to the container.
    pub selector: String,
    /// Kind of value this field yields.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Example value extracted during analysis; not carried into saved configs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// HTML attribute to read instead of text content (e.g. `href`, `src`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

/// Kind of value a field yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Plain text content.
    #[default]
    Text,
    /// Numeric value parsed from text.
    Number,
    /// Hyperlink target.
    Link,
    /// Image source.
    Image,
}

impl FieldType {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Number => "Number",
            Self::Link => "Link",
            Self::Image => "Image",
        }
    }
}
