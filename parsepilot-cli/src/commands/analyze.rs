//! Analyze command - run page analysis and print the candidates.

use anyhow::Result;
use clap::Args;
use tracing::info;
use url::Url;

use parsepilot_workflow::{Workflow, WorkflowError};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{AppContext, Cli, ExitCode};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Page URL to analyze.
    pub url: Url,

    /// Fetch without JavaScript rendering.
    #[arg(long)]
    pub no_js: bool,
}

/// Runs the analyze command.
pub async fn run(args: &AnalyzeArgs, cli: &Cli, ctx: &AppContext) -> Result<()> {
    info!(url = %args.url, "Starting analysis");

    let mut workflow = Workflow::start(
        ctx.api.clone(),
        ctx.poll.clone(),
        args.url.clone(),
        !args.no_js,
    )
    .await?;

    if !cli.json {
        println!("Analyzing {} ...", args.url);
    }

    if let Err(e) = workflow.await_analysis().await {
        if let WorkflowError::TaskFailure(message) = &e {
            eprintln!("Analysis failed: {}", message);
            std::process::exit(ExitCode::TaskFailed as i32);
        }
        return Err(e.into());
    }

    let session = workflow.session();
    let Some(session_id) = session.session_id() else {
        anyhow::bail!("analysis finished without a session id");
    };

    if cli.json {
        let formatter = JsonFormatter::new(cli.pretty);
        let output =
            formatter.format_analysis(session.analysis_task(), session_id, session.candidates())?;
        println!("{}", output);
    } else {
        let formatter = TextFormatter::new(!cli.no_color);
        println!("Session: {}", session_id);
        println!();
        println!("{}", formatter.format_candidates(session.candidates()));
    }

    Ok(())
}
