//! Config command - show one saved extraction config.

use anyhow::Result;
use clap::Args;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{AppContext, Cli};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    /// Config id to show.
    pub id: u32,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, ctx: &AppContext) -> Result<()> {
    let config = ctx.api.config(args.id).await?;

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_config(&config)?);
    } else {
        let formatter = TextFormatter::new(!cli.no_color);
        println!("{}", formatter.format_config(&config));
    }

    Ok(())
}
