//! Configs command - list saved extraction configs.

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{AppContext, Cli};

/// Arguments for the configs command.
#[derive(Args)]
pub struct ConfigsArgs {
    /// Only list configs saved for this domain.
    #[arg(long)]
    pub domain: Option<String>,
}

/// Runs the configs command.
pub async fn run(args: &ConfigsArgs, cli: &Cli, ctx: &AppContext) -> Result<()> {
    let configs = match &args.domain {
        Some(domain) => ctx.api.configs_by_domain(domain).await?,
        None => ctx.api.configs().await?,
    };

    info!(count = configs.len(), "Fetched configs");

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_configs(&configs)?);
        return Ok(());
    }

    if configs.is_empty() {
        println!("No saved configs.");
        return Ok(());
    }

    let formatter = TextFormatter::new(!cli.no_color);
    println!("{}", formatter.format_configs_header());
    for config in &configs {
        println!("{}", formatter.format_config_line(config));
    }

    Ok(())
}
