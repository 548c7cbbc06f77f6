//! CLI output formatting tests.
//!
//! These tests verify that workflow data renders correctly in both the
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use parsepilot_client::ScrapeProgress;
    use parsepilot_core::{Candidate, FieldOverlay, FieldSpec, FieldType, ParserConfig};
    use serde_json::json;

    fn sample_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                name: "title".to_string(),
                selector: "h2".to_string(),
                field_type: FieldType::Text,
                example: None,
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
    fn test_candidates_header_names_columns() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_candidates(&[]);

        assert!(output.contains("ID"));
        assert!(output.contains("Items"));
        assert!(output.contains("Selector"));
    }

    #[test]
    fn test_candidate_examples_are_indented() {
        let formatter = TextFormatter::new(false);
        let candidates = vec![Candidate {
            id: 1,
            container_selector: "li.row".to_string(),
            example_items: vec!["Blue Lamp".to_string()],
            count: 5,
        }];

        let output = formatter.format_candidates(&candidates);
        let example_line = output
            .lines()
            .find(|line| line.contains("Blue Lamp"))
            .unwrap();
        assert!(example_line.starts_with("       "));
    }

    #[test]
    fn test_field_numbering_is_one_based() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_fields(&sample_fields(), &FieldOverlay::new());

        let mut lines = output.lines();
        assert!(lines.next().unwrap().starts_with(" 1. "));
        assert!(lines.next().unwrap().starts_with(" 2. "));
    }

    #[test]
    fn test_selector_override_shown_in_listing() {
        let formatter = TextFormatter::new(false);
        let mut overlay = FieldOverlay::new();
        overlay.entry_mut("h2").selector = Some("h2.name".to_string());

        let output = formatter.format_fields(&sample_fields(), &overlay);
        assert!(output.contains("h2.name"));
    }

    #[test]
    fn test_progress_shows_question_mark_for_missing_counts() {
        let formatter = TextFormatter::new(false);
        let progress = ScrapeProgress {
            pages_processed: None,
            items_count: Some(3),
        };

        assert_eq!(formatter.format_progress(&progress), "  pages: ?, items: 3");
    }

    #[test]
    fn test_config_listing_aligns_with_header() {
        let formatter = TextFormatter::new(false);
        let config: ParserConfig = serde_json::from_value(json!({
            "id": 7,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        }))
        .unwrap();

        let header = formatter.format_configs_header();
        let line = formatter.format_config_line(&config);
        assert_eq!(header.find("Domain"), line.find("shop.example"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use parsepilot_core::{Candidate, ParserConfig, SessionId, TaskId};
    use serde_json::json;

    fn sample_candidate(example_items: Vec<String>) -> Candidate {
        Candidate {
            id: 2,
            container_selector: "div.card".to_string(),
            example_items,
            count: 12,
        }
    }

    #[test]
    fn test_analysis_output_uses_camel_case() {
        let formatter = JsonFormatter::new(false);
        let candidates = vec![sample_candidate(vec!["<div>x</div>".to_string()])];

        let output = formatter
            .format_analysis(&TaskId::from("t-1"), &SessionId::from("s-1"), &candidates)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["taskId"], "t-1");
        assert_eq!(parsed["sessionId"], "s-1");
        assert_eq!(parsed["candidates"][0]["selector"], "div.card");
        assert_eq!(parsed["candidates"][0]["exampleItems"][0], "<div>x</div>");
    }

    #[test]
    fn test_candidate_without_examples_omits_key() {
        let formatter = JsonFormatter::new(false);
        let candidates = vec![sample_candidate(vec![])];

        let output = formatter
            .format_analysis(&TaskId::from("t-1"), &SessionId::from("s-1"), &candidates)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(parsed["candidates"][0].get("exampleItems").is_none());
    }

    #[test]
    fn test_configs_listing_is_array() {
        let formatter = JsonFormatter::new(false);
        let config: ParserConfig = serde_json::from_value(json!({
            "id": 7,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        }))
        .unwrap();

        let output = formatter.format_configs(&[config]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(parsed.is_array());
        assert_eq!(parsed[0]["domain"], "shop.example");
    }

    #[test]
    fn test_empty_configs_listing_is_empty_array() {
        let formatter = JsonFormatter::new(false);

        let output = formatter.format_configs(&[]).unwrap();
        assert_eq!(output, "[]");
    }
}

// ============================================================================
// Output Snapshot Tests (for regression testing)
// ============================================================================

#[cfg(test)]
mod output_snapshot_tests {
    use super::super::text::TextFormatter;
    use parsepilot_core::{FieldOverlay, FieldSpec, FieldType, ScrapeResult};
    use serde_json::json;

    /// These tests pin the text layout the wizard prints. If the layout
    /// changes on purpose, update them alongside.

    #[test]
    fn test_field_line_prefix_is_stable() {
        let formatter = TextFormatter::new(false);
        let fields = vec![FieldSpec {
            name: "title".to_string(),
            selector: "h2".to_string(),
            field_type: FieldType::Text,
            example: None,
            attribute: None,
        }];

        let output = formatter.format_fields(&fields, &FieldOverlay::new());
        assert!(output.starts_with(" 1. [x] title"));
    }

    #[test]
    fn test_result_rows_carry_no_trailing_whitespace() {
        let formatter = TextFormatter::new(false);
        let result: ScrapeResult = serde_json::from_value(json!({
            "task_id": "t-2",
            "data": [
                {"title": "Alpha", "price": 10},
                {"title": "Beta", "price": 12}
            ],
            "total_items": 2
        }))
        .unwrap();

        let output = formatter.format_result(&result);
        for row in output.lines().skip(1).take(result.data.len()) {
            assert_eq!(row, row.trim_end());
        }
    }

    #[test]
    fn test_error_line_format() {
        let formatter = TextFormatter::new(false);
        assert_eq!(
            formatter.format_error("Analysis", "connection refused"),
            "Analysis: Error - connection refused"
        );
    }
}
