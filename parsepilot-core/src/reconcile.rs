//! Candidate and field reconciliation.
//!
//! Pure functions that turn server-provided candidates and fields plus the
//! user's edit overlay into a save-ready [`ConfigData`]:
//!
//! - [`choose_candidate`] resolves a candidate id to its container selector
//! - [`build_config`] merges fields with a [`FieldOverlay`]
//!
//! Neither function has side effects; calling them twice with the same inputs
//! yields structurally identical output.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::models::{Candidate, ConfigData, FieldSpec};

// ============================================================================
// Overlay
// ============================================================================

/// One user edit for a field, keyed by the field's original selector.
///
/// Absent overrides fall back to the field's original values. A field with no
/// overlay entry at all counts as included, matching the default-all-selected
/// behavior of the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    /// Display-name override.
    pub name: Option<String>,
    /// Selector override.
    pub selector: Option<String>,
    /// Whether the field makes it into the saved config.
    pub included: bool,
}

impl FieldEdit {
    /// An edit that changes nothing: no overrides, still included.
    pub fn new() -> Self {
        Self {
            name: None,
            selector: None,
            included: true,
        }
    }

    /// Marks the field as excluded.
    pub fn excluded() -> Self {
        Self {
            included: false,
            ..Self::new()
        }
    }

    /// Sets a display-name override.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a selector override.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

impl Default for FieldEdit {
    fn default() -> Self {
        Self::new()
    }
}

/// User edits layered non-destructively over server-provided fields.
///
/// Keys are original field selectors, so each field has at most one entry.
/// Entries keyed by a selector that matches no field are ignored by
/// [`build_config`]; they cannot invent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOverlay {
    entries: HashMap<String, FieldEdit>,
}

impl FieldOverlay {
    /// Creates an empty overlay: every field included, nothing renamed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the edit for a selector, if one exists.
    pub fn get(&self, selector: &str) -> Option<&FieldEdit> {
        self.entries.get(selector)
    }

    /// Returns the edit for a selector, inserting a no-op edit first if none
    /// exists yet.
    pub fn entry_mut(&mut self, selector: &str) -> &mut FieldEdit {
        self.entries
            .entry(selector.to_string())
            .or_insert_with(FieldEdit::new)
    }

    /// Replaces the edit for a selector wholesale.
    pub fn set(&mut self, selector: impl Into<String>, edit: FieldEdit) {
        self.entries.insert(selector.into(), edit);
    }

    /// Returns true when no edits have been made.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of edited fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Resolves a chosen candidate id to its container selector.
///
/// # Errors
///
/// Returns [`CoreError::UnknownCandidate`] when `chosen_id` matches no
/// candidate in the set.
pub fn choose_candidate(candidates: &[Candidate], chosen_id: u32) -> Result<&str, CoreError> {
    candidates
        .iter()
        .find(|candidate| candidate.id == chosen_id)
        .map(|candidate| candidate.container_selector.as_str())
        .ok_or(CoreError::UnknownCandidate(chosen_id))
}

/// Merges original fields with the user's overlay into a save-ready config.
///
/// Iterates the fields in server order, which is the canonical display and
/// save order: the output is the input restricted to included fields, with
/// name/selector overrides applied and originals kept where no override
/// exists. `example` values are analysis-time previews and are not carried
/// into the config.
///
/// # Errors
///
/// Returns [`CoreError::EmptySelection`] when every field is excluded.
pub fn build_config(
    container_selector: &str,
    fields: &[FieldSpec],
    overlay: &FieldOverlay,
) -> Result<ConfigData, CoreError> {
    let mut merged = Vec::new();

    for field in fields {
        let edit = overlay.get(&field.selector);
        if let Some(edit) = edit {
            if !edit.included {
                continue;
            }
        }
        let (name, selector) = match edit {
            Some(edit) => (
                edit.name.clone().unwrap_or_else(|| field.name.clone()),
                edit.selector
                    .clone()
                    .unwrap_or_else(|| field.selector.clone()),
            ),
            None => (field.name.clone(), field.selector.clone()),
        };
        merged.push(FieldSpec {
            name,
            selector,
            field_type: field.field_type,
            example: None,
            attribute: field.attribute.clone(),
        });
    }

    if merged.is_empty() {
        return Err(CoreError::EmptySelection);
    }

    Ok(ConfigData {
        container_selector: container_selector.to_string(),
        fields: merged,
        pagination: None,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldType;

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate {
                id: 1,
                container_selector: "li.row".to_string(),
                example_items: vec!["<li>x</li>".to_string()],
                count: 5,
            },
            Candidate {
                id: 2,
                container_selector: "div.card".to_string(),
                example_items: vec![],
                count: 12,
            },
        ]
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                name: "title".to_string(),
                selector: "h2".to_string(),
                field_type: FieldType::Text,
                example: Some("Widget".to_string()),
                attribute: None,
            },
            FieldSpec {
                name: "price".to_string(),
                selector: ".price".to_string(),
                field_type: FieldType::Number,
                example: Some("19.99".to_string()),
                attribute: None,
            },
            FieldSpec {
                name: "link".to_string(),
                selector: "a".to_string(),
                field_type: FieldType::Link,
                example: None,
                attribute: Some("href".to_string()),
            },
        ]
    }

    #[test]
    fn test_choose_candidate_by_id() {
        let candidates = candidates();
        assert_eq!(choose_candidate(&candidates, 1).unwrap(), "li.row");
        assert_eq!(choose_candidate(&candidates, 2).unwrap(), "div.card");
    }

    #[test]
    fn test_choose_candidate_unknown_id() {
        let candidates = candidates();
        let err = choose_candidate(&candidates, 99).unwrap_err();
        assert!(matches!(err, CoreError::UnknownCandidate(99)));
    }

    #[test]
    fn test_choose_candidate_empty_set() {
        let err = choose_candidate(&[], 1).unwrap_err();
        assert!(matches!(err, CoreError::UnknownCandidate(1)));
    }

    #[test]
    fn test_build_config_empty_overlay_keeps_everything() {
        let config = build_config("div.card", &fields(), &FieldOverlay::new()).unwrap();
        assert_eq!(config.container_selector, "div.card");
        let names: Vec<_> = config.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "price", "link"]);
        assert!(config.pagination.is_none());
    }

    #[test]
    fn test_build_config_excludes_only_flagged_fields() {
        let mut overlay = FieldOverlay::new();
        overlay.set(".price", FieldEdit::excluded());
        // An entry with included = true must not exclude anything.
        overlay.set("h2", FieldEdit::new().with_name("Title"));

        let config = build_config("div.card", &fields(), &overlay).unwrap();
        let names: Vec<_> = config.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Title", "link"]);
    }

    #[test]
    fn test_build_config_preserves_server_order() {
        let mut overlay = FieldOverlay::new();
        // Edit in reverse order; output order must still follow the input.
        overlay.set("a", FieldEdit::new().with_name("url"));
        overlay.set("h2", FieldEdit::new().with_name("heading"));

        let config = build_config("div.card", &fields(), &overlay).unwrap();
        let names: Vec<_> = config.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["heading", "price", "url"]);
    }

    #[test]
    fn test_build_config_applies_selector_override() {
        let mut overlay = FieldOverlay::new();
        overlay.set("h2", FieldEdit::new().with_selector("h2 span.name"));

        let config = build_config("div.card", &fields(), &overlay).unwrap();
        assert_eq!(config.fields[0].selector, "h2 span.name");
        // Untouched fields keep their original selectors.
        assert_eq!(config.fields[1].selector, ".price");
    }

    #[test]
    fn test_build_config_drops_examples_keeps_attributes() {
        let config = build_config("div.card", &fields(), &FieldOverlay::new()).unwrap();
        assert!(config.fields.iter().all(|f| f.example.is_none()));
        assert_eq!(config.fields[2].attribute.as_deref(), Some("href"));
        assert_eq!(config.fields[2].field_type, FieldType::Link);
    }

    #[test]
    fn test_build_config_all_excluded_is_an_error() {
        let mut overlay = FieldOverlay::new();
        for field in fields() {
            overlay.set(field.selector, FieldEdit::excluded());
        }
        let err = build_config("div.card", &fields(), &overlay).unwrap_err();
        assert!(matches!(err, CoreError::EmptySelection));
    }

    #[test]
    fn test_build_config_no_fields_is_an_error() {
        let err = build_config("div.card", &[], &FieldOverlay::new()).unwrap_err();
        assert!(matches!(err, CoreError::EmptySelection));
    }

    #[test]
    fn test_build_config_ignores_unknown_overlay_keys() {
        let mut overlay = FieldOverlay::new();
        overlay.set(
            ".does-not-exist",
            FieldEdit::new().with_name("phantom"),
        );
        overlay.set(".also-missing", FieldEdit::excluded());

        let config = build_config("div.card", &fields(), &overlay).unwrap();
        assert_eq!(config.fields.len(), 3);
        assert!(config.fields.iter().all(|f| f.name != "phantom"));
    }

    #[test]
    fn test_build_config_is_idempotent() {
        let mut overlay = FieldOverlay::new();
        overlay.set(".price", FieldEdit::excluded());
        overlay.set("h2", FieldEdit::new().with_name("Title").with_selector("h2.t"));

        let first = build_config("div.card", &fields(), &overlay).unwrap();
        let second = build_config("div.card", &fields(), &overlay).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_field_edit_builder() {
        let edit = FieldEdit::new().with_name("Title").with_selector("h2.t");
        assert!(edit.included);
        assert_eq!(edit.name.as_deref(), Some("Title"));
        assert_eq!(edit.selector.as_deref(), Some("h2.t"));

        let excluded = FieldEdit::excluded();
        assert!(!excluded.included);
        assert!(excluded.name.is_none());
    }

    #[test]
    fn test_overlay_entry_mut_defaults_to_included() {
        let mut overlay = FieldOverlay::new();
        assert!(overlay.is_empty());
        let edit = overlay.entry_mut("h2");
        assert!(edit.included);
        edit.name = Some("Title".to_string());
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.get("h2").unwrap().name.as_deref(), Some("Title"));
    }
}
