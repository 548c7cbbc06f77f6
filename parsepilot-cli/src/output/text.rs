//! Text output formatting with colors.

use parsepilot_client::ScrapeProgress;
use parsepilot_core::{Candidate, FieldOverlay, FieldSpec, ParserConfig, ScrapeResult};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Widest a result cell gets before truncation.
const MAX_CELL_WIDTH: usize = 40;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Candidates and fields
    // ========================================================================

    /// Formats the candidate list as a numbered table.
    pub fn format_candidates(&self, candidates: &[Candidate]) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{:<6} {:<8} {}",
            self.bold("ID"),
            self.bold("Items"),
            self.bold("Selector")
        ));
        for candidate in candidates {
            lines.push(format!(
                "{:<6} {:<8} {}",
                candidate.id,
                candidate.count,
                self.cyan(&candidate.container_selector)
            ));
            for example in candidate.example_items.iter().take(2) {
                lines.push(format!("       {}", self.dim(&truncate(example, 70))));
            }
        }

        lines.join("\n")
    }

    /// Formats the field list with overlay edits applied for preview.
    ///
    /// Each line shows the effective name and selector; excluded fields get
    /// an empty checkbox. Lines are numbered for the wizard's edit commands.
    pub fn format_fields(&self, fields: &[FieldSpec], overlay: &FieldOverlay) -> String {
        let mut lines = Vec::new();

        for (index, field) in fields.iter().enumerate() {
            let edit = overlay.get(&field.selector);
            let included = edit.map_or(true, |e| e.included);
            let name = edit
                .and_then(|e| e.name.as_deref())
                .unwrap_or(&field.name);
            let selector = edit
                .and_then(|e| e.selector.as_deref())
                .unwrap_or(&field.selector);

            let checkbox = if included {
                self.green("[x]")
            } else {
                self.dim("[ ]")
            };
            let mut line = format!(
                "{:>2}. {} {:<16} {:<24} {}",
                index + 1,
                checkbox,
                name,
                self.cyan(selector),
                self.dim(field.field_type.label())
            );
            if let Some(example) = &field.example {
                line.push_str(&format!("  {}", self.dim(&truncate(example, 30))));
            }
            lines.push(line);
        }

        lines.join("\n")
    }

    // ========================================================================
    // Configs
    // ========================================================================

    /// Formats the config list header.
    pub fn format_configs_header(&self) -> String {
        format!(
            "{:<6} {:<24} {:<8} {}",
            self.bold("ID"),
            self.bold("Domain"),
            self.bold("Fields"),
            self.bold("Saved")
        )
    }

    /// Formats a single config list line.
    pub fn format_config_line(&self, config: &ParserConfig) -> String {
        format!(
            "{:<6} {:<24} {:<8} {}",
            config.id,
            config.domain,
            config.config.fields.len(),
            config.created_at.format("%Y-%m-%d %H:%M")
        )
    }

    /// Formats one config in full.
    pub fn format_config(&self, config: &ParserConfig) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{} #{}", self.bold("Config"), config.id));
        lines.push(format!("Domain:    {}", config.domain));
        if let Some(pattern) = &config.url_pattern {
            lines.push(format!("Pattern:   {}", pattern));
        }
        lines.push(format!(
            "Container: {}",
            self.cyan(&config.config.container_selector)
        ));
        lines.push(format!("Saved:     {}", config.created_at.format("%Y-%m-%d %H:%M")));
        lines.push(String::new());
        lines.push(self.bold("Fields:"));
        for field in &config.config.fields {
            let mut line = format!(
                "  {:<16} {:<24} {}",
                field.name,
                self.cyan(&field.selector),
                self.dim(field.field_type.label())
            );
            if let Some(attribute) = &field.attribute {
                line.push_str(&format!("  {}", self.dim(&format!("@{}", attribute))));
            }
            lines.push(line);
        }

        lines.join("\n")
    }

    // ========================================================================
    // Scrape progress and results
    // ========================================================================

    /// Formats one in-flight progress update.
    pub fn format_progress(&self, progress: &ScrapeProgress) -> String {
        let pages = progress
            .pages_processed
            .map_or_else(|| "?".to_string(), |p| p.to_string());
        let items = progress
            .items_count
            .map_or_else(|| "?".to_string(), |i| i.to_string());
        self.dim(&format!("  pages: {}, items: {}", pages, items))
    }

    /// Formats extracted records as a table.
    ///
    /// Columns are the union of record keys; records keep their sequence.
    pub fn format_result(&self, result: &ScrapeResult) -> String {
        if result.is_empty() {
            return self.dim("No items extracted.");
        }

        let columns = result_columns(result);
        let mut lines = Vec::new();

        lines.push(
            columns
                .iter()
                .map(|c| format!("{:<w$}", self.bold(c), w = cell_pad(self.use_colors)))
                .collect::<Vec<_>>()
                .join(" "),
        );
        for record in &result.data {
            let row = columns
                .iter()
                .map(|column| {
                    let cell = record.get(column).map_or(String::new(), cell_text);
                    format!("{:<w$}", truncate(&cell, MAX_CELL_WIDTH), w = MAX_CELL_WIDTH)
                })
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(row.trim_end().to_string());
        }
        lines.push(String::new());
        lines.push(format!("{} items", self.bold(&result.total_items.to_string())));

        lines.join("\n")
    }

    /// Formats an error message.
    pub fn format_error(&self, context: &str, error: &str) -> String {
        format!("{}: {} - {}", self.bold(context), self.red("Error"), error)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn bold(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", BOLD, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", DIM, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", GREEN, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn red(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", RED, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn cyan(&self, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", CYAN, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Union of record keys across the result, in first-seen key order.
fn result_columns(result: &ScrapeResult) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in &result.data {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Renders one JSON value as a bare cell.
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Header cells need wider padding when ANSI codes eat into the width.
fn cell_pad(use_colors: bool) -> usize {
    if use_colors {
        MAX_CELL_WIDTH + BOLD.len() + RESET.len()
    } else {
        MAX_CELL_WIDTH
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parsepilot_core::FieldType;
    use serde_json::json;

    fn sample_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec {
                name: "title".to_string(),
                selector: "h2".to_string(),
                field_type: FieldType::Text,
                example: Some("Red Chair".to_string()),
                attribute: None,
            },
            FieldSpec {
                name: "price".to_string(),
                selector: ".price".to_string(),
                field_type: FieldType::Number,
                example: None,
                attribute: None,
            },
        ]
    }

    #[test]
    fn test_format_candidates_lists_ids_and_counts() {
        let formatter = TextFormatter::new(false);
        let candidates = vec![
            Candidate {
                id: 1,
                container_selector: "li.row".to_string(),
                example_items: vec!["First item".to_string()],
                count: 5,
            },
            Candidate {
                id: 2,
                container_selector: "div.card".to_string(),
                example_items: vec![],
                count: 12,
            },
        ];

        let output = formatter.format_candidates(&candidates);
        assert!(output.contains("li.row"));
        assert!(output.contains("div.card"));
        assert!(output.contains("12"));
        assert!(output.contains("First item"));
    }

    #[test]
    fn test_format_fields_shows_exclusion() {
        let formatter = TextFormatter::new(false);
        let mut overlay = FieldOverlay::new();
        overlay.entry_mut(".price").included = false;

        let output = formatter.format_fields(&sample_fields(), &overlay);
        assert!(output.contains("[x] title"));
        assert!(output.contains("[ ] price"));
    }

    #[test]
    fn test_format_fields_shows_renames() {
        let formatter = TextFormatter::new(false);
        let mut overlay = FieldOverlay::new();
        overlay.entry_mut("h2").name = Some("product".to_string());

        let output = formatter.format_fields(&sample_fields(), &overlay);
        assert!(output.contains("product"));
        assert!(!output.contains("[x] title"));
    }

    #[test]
    fn test_format_result_table() {
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
        assert!(output.contains("Alpha"));
        assert!(output.contains("10"));
        assert!(output.contains("2 items"));
    }

    #[test]
    fn test_format_result_empty() {
        let formatter = TextFormatter::new(false);
        let result: ScrapeResult = serde_json::from_value(json!({
            "task_id": "t-2",
            "data": [],
            "total_items": 0
        }))
        .unwrap();

        assert_eq!(formatter.format_result(&result), "No items extracted.");
    }

    #[test]
    fn test_truncate_long_cells() {
        assert_eq!(truncate("short", 10), "short");
        let long = "x".repeat(50);
        let cut = truncate(&long, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_colors_disabled_leaves_plain_text() {
        let formatter = TextFormatter::new(false);
        let config: ParserConfig = serde_json::from_value(json!({
            "id": 7,
            "domain": "shop.example",
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        }))
        .unwrap();

        let output = formatter.format_config(&config);
        assert!(!output.contains("\x1b["));
        assert!(output.contains("Config #7"));
        assert!(output.contains("shop.example"));
    }
}
