//! Scrape command - run an extraction from a saved config.

use anyhow::Result;
use clap::Args;
use tracing::info;

use parsepilot_client::{PollError, ScrapePoll, TaskPoller};
use parsepilot_core::ParserConfig;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{AppContext, Cli, ExitCode};

/// Arguments for the scrape command.
#[derive(Args)]
pub struct ScrapeArgs {
    /// Saved config id to scrape with.
    pub config_id: u32,

    /// First page URL (default: the config's URL pattern with page 1).
    #[arg(long)]
    pub start_url: Option<String>,

    /// Stop after this many pages.
    #[arg(long)]
    pub max_pages: Option<u32>,
}

/// Runs the scrape command.
pub async fn run(args: &ScrapeArgs, cli: &Cli, ctx: &AppContext) -> Result<()> {
    let config = ctx.api.config(args.config_id).await?;
    let start_url = resolve_start_url(args.start_url.as_deref(), &config)?;

    info!(config_id = config.id, url = %start_url, "Starting scrape");

    let task_id = ctx
        .api
        .start_scrape(config.id, &start_url, args.max_pages)
        .await?;

    if !cli.json {
        println!("Scraping {} (task {}) ...", start_url, task_id);
    }

    let formatter = TextFormatter::new(!cli.no_color);
    let target = ScrapePoll::new(&ctx.api, task_id.clone());
    let poller = TaskPoller::new(ctx.poll.clone());
    let outcome = poller
        .run(&target, |progress| {
            if !cli.json {
                println!("{}", formatter.format_progress(&progress));
            }
        })
        .await;

    if let Err(e) = outcome {
        if let PollError::TaskFailed(message) = &e {
            eprintln!("Scrape failed: {}", message);
            std::process::exit(ExitCode::TaskFailed as i32);
        }
        return Err(e.into());
    }

    let result = ctx.api.scrape_result(&task_id).await?;

    if cli.json {
        let json = JsonFormatter::new(cli.pretty);
        println!("{}", json.format_result(&result)?);
    } else {
        println!();
        println!("{}", formatter.format_result(&result));
    }

    Ok(())
}

/// Picks the first page URL: an explicit flag wins over the config's prefill.
fn resolve_start_url(explicit: Option<&str>, config: &ParserConfig) -> Result<String> {
    explicit
        .map(str::to_string)
        .or_else(|| config.first_page_url())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "config {} has no URL pattern; pass --start-url",
                config.id
            )
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with_pattern(pattern: Option<&str>) -> ParserConfig {
        serde_json::from_value(json!({
            "id": 7,
            "domain": "shop.example",
            "url_pattern": pattern,
            "config": {"container_selector": "div.card", "fields": []},
            "created_at": "2024-05-01T12:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_explicit_url_wins_over_pattern() {
        let config = config_with_pattern(Some("https://shop.example/catalog?page={page}"));
        let url = resolve_start_url(Some("https://shop.example/sale"), &config).unwrap();
        assert_eq!(url, "https://shop.example/sale");
    }

    #[test]
    fn test_pattern_prefills_first_page() {
        let config = config_with_pattern(Some("https://shop.example/catalog?page={page}"));
        let url = resolve_start_url(None, &config).unwrap();
        assert_eq!(url, "https://shop.example/catalog?page=1");
    }

    #[test]
    fn test_missing_pattern_requires_explicit_url() {
        let config = config_with_pattern(None);
        let err = resolve_start_url(None, &config).unwrap_err();
        assert!(err.to_string().contains("--start-url"));
    }
}
