//! Wizard command - full interactive analyze-to-scrape flow.

use anyhow::Result;
use clap::Args;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;
use url::Url;

use parsepilot_core::FieldSpec;
use parsepilot_workflow::{Workflow, WorkflowError};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{AppContext, Cli, ExitCode};

/// Arguments for the wizard command.
#[derive(Args)]
pub struct WizardArgs {
    /// Page URL to analyze and scrape.
    pub url: Url,

    /// Fetch without JavaScript rendering.
    #[arg(long)]
    pub no_js: bool,
}

/// Runs the wizard command.
pub async fn run(args: &WizardArgs, cli: &Cli, ctx: &AppContext) -> Result<()> {
    let formatter = TextFormatter::new(!cli.no_color);
    let mut input = BufReader::new(io::stdin());

    info!(url = %args.url, "Wizard started");

    println!("ParsePilot Wizard");
    println!("{}", "─".repeat(40));
    println!();

    let mut workflow = Workflow::start(
        ctx.api.clone(),
        ctx.poll.clone(),
        args.url.clone(),
        !args.no_js,
    )
    .await?;

    println!("Analyzing {} ...", args.url);
    if let Err(e) = workflow.await_analysis().await {
        if let WorkflowError::TaskFailure(message) = &e {
            eprintln!("Analysis failed: {}", message);
            std::process::exit(ExitCode::TaskFailed as i32);
        }
        return Err(e.into());
    }

    // Candidate selection
    println!();
    println!("{}", formatter.format_candidates(workflow.session().candidates()));
    println!();
    loop {
        let answer = ask(&mut input, "Candidate id to use: ").await?;
        let Ok(id) = answer.parse::<u32>() else {
            println!("Enter a candidate id from the list.");
            continue;
        };
        match workflow.select_candidate(id).await {
            Ok(()) => break,
            Err(e) if e.is_recoverable() => {
                println!("{}", formatter.format_error("Selection", &e.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Field tuning
    println!();
    print_fields(&formatter, &workflow);
    println!();
    println!("Edit fields: toggle <n>, rename <n> <name>, selector <n> <css>, done");
    loop {
        let line = ask(&mut input, "> ").await?;
        let command = match parse_field_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if matches!(command, FieldCommand::Done) {
            let answer = ask(
                &mut input,
                "URL pattern with a {page} placeholder (empty to skip): ",
            )
            .await?;
            let pattern = (!answer.is_empty()).then_some(answer);
            match workflow.save_config(pattern).await {
                Ok(()) => break,
                Err(e) if e.is_recoverable() => {
                    println!("{}", formatter.format_error("Save", &e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
            continue;
        }

        match apply_edit(&mut workflow, &command) {
            Ok(()) => print_fields(&formatter, &workflow),
            Err(e) => println!("{}", e),
        }
    }

    if let Some(config) = workflow.session().saved_config() {
        println!("Saved config #{} for {}", config.id, config.domain);
    }

    // Scrape
    let answer = ask(&mut input, "Run a scrape now? [Y/n] ").await?;
    if answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no") {
        if let Some(config) = workflow.session().saved_config() {
            println!("Run it later with: parsepilot scrape {}", config.id);
        }
        return Ok(());
    }

    let max_pages = loop {
        let answer = ask(&mut input, "Max pages (empty for no limit): ").await?;
        if answer.is_empty() {
            break None;
        }
        match answer.parse::<u32>() {
            Ok(pages) => break Some(pages),
            Err(_) => println!("Enter a number or leave empty."),
        }
    };

    let prefill = workflow
        .session()
        .saved_config()
        .and_then(|config| config.first_page_url());
    loop {
        let question = match &prefill {
            Some(url) => format!("Start URL [{}]: ", url),
            None => "Start URL: ".to_string(),
        };
        let answer = ask(&mut input, &question).await?;
        let explicit = (!answer.is_empty()).then_some(answer);
        match workflow.start_scrape(explicit, max_pages).await {
            Ok(()) => break,
            Err(e) if e.is_recoverable() => {
                println!("{}", formatter.format_error("Scrape", &e.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("Scraping ...");
    let outcome = workflow
        .await_scrape(|progress| {
            println!("{}", formatter.format_progress(&progress));
        })
        .await;
    if let Err(e) = outcome {
        if let WorkflowError::TaskFailure(message) = &e {
            eprintln!("Scrape failed: {}", message);
            std::process::exit(ExitCode::TaskFailed as i32);
        }
        return Err(e.into());
    }

    let result = workflow.result()?;
    if cli.json {
        let json = JsonFormatter::new(cli.pretty);
        println!("{}", json.format_result(result)?);
    } else {
        println!();
        println!("{}", formatter.format_result(result));
    }

    Ok(())
}

// ============================================================================
// Prompting
// ============================================================================

/// Prints the question and reads one trimmed line. Errors when stdin closes.
async fn ask(input: &mut BufReader<io::Stdin>, question: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", question);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        anyhow::bail!("input closed before the wizard finished");
    }
    Ok(line.trim().to_string())
}

fn print_fields(formatter: &TextFormatter, workflow: &Workflow) {
    let session = workflow.session();
    println!("{}", formatter.format_fields(session.fields(), session.overlay()));
}

// ============================================================================
// Field-tuning commands
// ============================================================================

/// One edit command in the field-tuning loop.
#[derive(Debug, PartialEq, Eq)]
enum FieldCommand {
    /// Flip a field in or out of the config.
    Toggle(usize),
    /// Rename a field in the output.
    Rename(usize, String),
    /// Point a field at a different selector.
    Selector(usize, String),
    /// Finish tuning and save.
    Done,
}

/// Parses one line of the field-tuning loop.
///
/// Accepted forms: `toggle <n>`, `rename <n> <name>`, `selector <n> <css>`,
/// `done`. A bare number is shorthand for `toggle <n>`.
fn parse_field_command(line: &str) -> Result<FieldCommand> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        anyhow::bail!("empty command; try \"toggle 2\" or \"done\"");
    };

    if let Ok(number) = verb.parse::<usize>() {
        return Ok(FieldCommand::Toggle(number));
    }

    match verb.to_lowercase().as_str() {
        "done" | "save" => Ok(FieldCommand::Done),
        "toggle" => Ok(FieldCommand::Toggle(parse_number(parts.next())?)),
        "rename" => {
            let number = parse_number(parts.next())?;
            let name = parts.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                anyhow::bail!("rename needs a new name: rename <n> <name>");
            }
            Ok(FieldCommand::Rename(number, name))
        }
        "selector" => {
            let number = parse_number(parts.next())?;
            let selector = parts.collect::<Vec<_>>().join(" ");
            if selector.is_empty() {
                anyhow::bail!("selector needs a CSS selector: selector <n> <css>");
            }
            Ok(FieldCommand::Selector(number, selector))
        }
        other => anyhow::bail!(
            "unknown command \"{}\"; try toggle, rename, selector, done",
            other
        ),
    }
}

fn parse_number(part: Option<&str>) -> Result<usize> {
    part.and_then(|p| p.parse().ok())
        .ok_or_else(|| anyhow::anyhow!("expected a field number from the list"))
}

/// Maps a 1-based listing number to the field's selector key.
fn field_selector(fields: &[FieldSpec], number: usize) -> Result<String> {
    if number == 0 || number > fields.len() {
        anyhow::bail!("no field numbered {}; the list shows 1-{}", number, fields.len());
    }
    Ok(fields[number - 1].selector.clone())
}

/// Applies one edit command to the session overlay.
fn apply_edit(workflow: &mut Workflow, command: &FieldCommand) -> Result<()> {
    match command {
        FieldCommand::Toggle(number) => {
            let selector = field_selector(workflow.session().fields(), *number)?;
            let included = workflow
                .session()
                .overlay()
                .get(&selector)
                .map_or(true, |edit| edit.included);
            workflow.set_field_included(&selector, !included)?;
        }
        FieldCommand::Rename(number, name) => {
            let selector = field_selector(workflow.session().fields(), *number)?;
            workflow.rename_field(&selector, name)?;
        }
        FieldCommand::Selector(number, new_selector) => {
            let selector = field_selector(workflow.session().fields(), *number)?;
            workflow.override_field_selector(&selector, new_selector)?;
        }
        FieldCommand::Done => {}
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
