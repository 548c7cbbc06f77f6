//! Export command - download the results of a finished run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use parsepilot_client::ExportFormat;
use parsepilot_core::TaskId;

use crate::output::JsonFormatter;
use crate::{AppContext, Cli};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Task id of the finished scrape run.
    pub task_id: String,

    /// Export format: json or excel.
    #[arg(long, default_value = "json")]
    pub format: ExportFormat,

    /// File to write (default: export-<task>.<ext> in the current directory).
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Runs the export command.
pub async fn run(args: &ExportArgs, cli: &Cli, ctx: &AppContext) -> Result<()> {
    let task_id = TaskId::from(args.task_id.as_str());
    let payload = ctx.api.export(&task_id, args.format).await?;

    let path = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(format!("export-{}.{}", task_id, args.format.extension()))
    });
    tokio::fs::write(&path, &payload.bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    info!(path = %path.display(), bytes = payload.bytes.len(), "Export written");

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        println!("{}", formatter.format_export(&task_id, &path, &payload)?);
    } else {
        println!("Wrote {} bytes to {}", payload.bytes.len(), path.display());
    }

    Ok(())
}
