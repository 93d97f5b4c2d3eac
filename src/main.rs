//! gitmuse - CLI entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Confirm, Password};
use git2::Repository;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use gitmuse::config;
use gitmuse::error::{ConfigError, ExecutionError, GitError};
use gitmuse::gemini::{
    GeminiClient, GenerationRequest, available_keys, fallback_order, generate_with_fallback,
    resolve_model,
};
use gitmuse::git::{Git2Backend, collect_snapshot};
use gitmuse::prompt::{build_system_prompt, build_user_message};
use gitmuse::suggest::{
    CommitOperation, ExecutionOutcome, StepProgress, execute_operations, parse_suggestion,
    render_tree,
};
use gitmuse::ui;

/// Suggest and apply AI-generated git commits.
#[derive(Parser, Debug)]
#[command(name = "gitmuse")]
#[command(about = "Suggest and apply AI-generated git commits")]
#[command(version)]
struct Cli {
    /// Gemini API key (overrides the environment and the config file)
    #[arg(short = 'k', long = "api-key", value_name = "KEY")]
    api_key: Option<String>,

    /// Context for the changes (e.g. "refactoring folder structure")
    #[arg(short, long)]
    context: Option<String>,

    /// Model tried first; the others are fallbacks on rate limits
    /// [keys: flash-lite, flash, flash-3]
    #[arg(short, long)]
    model: Option<String>,

    /// Apply the suggested commits after confirmation
    #[arg(short = 'x', long)]
    execute: bool,

    /// Skip the confirmation prompt (only with --execute)
    #[arg(long, requires = "execute")]
    yes: bool,

    /// Ask the model to explain each suggested commit grouping
    #[arg(long)]
    explain: bool,

    /// Save a Gemini API key to the config file and exit
    #[arg(short = 's', long = "set-key", value_name = "KEY")]
    set_key: Option<String>,

    /// Delete the saved API key and exit
    #[arg(short = 'd', long = "delete-key")]
    delete_key: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(key) = cli.set_key.as_deref() {
        config::save_api_key(key.trim())?;
        ui::success("API key saved.");
        return Ok(());
    }

    if cli.delete_key {
        if config::delete_api_key()? {
            ui::success("API key deleted.");
        } else {
            ui::info("No API key was stored.");
        }
        return Ok(());
    }

    let api_key = resolve_api_key(cli.api_key.as_deref())?;

    let repo = Repository::discover(".").map_err(GitError::NotARepository)?;

    if let Some(key) = cli.model.as_deref() {
        if !available_keys().iter().any(|k| *k == key) {
            ui::warning(&format!(
                "Unknown model key '{key}' (available: {}), using the default.",
                available_keys().join(", ")
            ));
        }
    }

    let spinner = make_spinner("Analyzing repository...");
    let snapshot = collect_snapshot(&repo).inspect_err(|_| spinner.finish_and_clear())?;

    if !snapshot.has_changes() {
        spinner.finish_and_clear();
        ui::warning("No changes detected (staged, unstaged, or untracked).");
        return Ok(());
    }

    match cli.context.as_deref() {
        Some(ctx) => spinner.set_message(format!("Generating suggestion with context: \"{ctx}\"...")),
        None => spinner.set_message("Generating suggestion..."),
    }

    let user_rules = config::load_user_rules();
    let request = GenerationRequest {
        system_prompt: build_system_prompt(user_rules.as_deref(), cli.explain),
        user_message: build_user_message(&snapshot, cli.context.as_deref()),
    };

    let first_model = resolve_model(cli.model.as_deref());
    let models = fallback_order(first_model);
    let client = GeminiClient::new(api_key);

    let suggestion = match generate_with_fallback(&client, &models, &request).await {
        Ok(text) => {
            spinner.finish_and_clear();
            ui::success("Suggestion generated.");
            text
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).context("Failed to generate a commit suggestion");
        }
    };

    ui::print_suggestion(&suggestion);

    let operations = parse_suggestion(&suggestion);
    if operations.is_empty() {
        ui::warning("No executable git operations were recognized in the suggestion.");
        return Ok(());
    }

    if !cli.execute {
        ui::tip("Commands above are suggestions. Re-run with --execute to apply them after confirmation.");
        return Ok(());
    }

    print_plan(&operations);

    let confirmed = cli.yes
        || Confirm::new()
            .with_prompt(format!("Apply {} commit(s)?", operations.len()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

    if !confirmed {
        ui::info("Aborted. Nothing was committed.");
        return Ok(());
    }

    let mut backend = Git2Backend::new(&repo);
    let mut report_step = |progress: &StepProgress| {
        ui::success(&format!(
            "[{}/{}] {} {}",
            progress.index, progress.total, progress.short_id, progress.message
        ));
        for line in &progress.tree {
            println!("    {line}");
        }
    };

    match execute_operations(&operations, &mut backend, &mut report_step) {
        Ok(ExecutionOutcome::Completed { steps }) => {
            println!();
            ui::success(&format!("Created {steps} commit(s)."));
            Ok(())
        }
        Ok(ExecutionOutcome::NothingToExecute) => {
            ui::info("Nothing to execute.");
            Ok(())
        }
        Err(err) => {
            let ExecutionError::Aborted {
                step,
                total,
                completed,
                ..
            } = &err;
            println!();
            if *completed > 0 {
                ui::warning(&format!(
                    "{completed} of {total} commit(s) were created before the failure and remain committed."
                ));
            }
            ui::error("Execution aborted", &format!("commit {step} of {total} failed"));
            ui::tip("Fix the issue and re-run gitmuse for the remaining changes.");
            Err(err.into())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn make_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Resolve the API key: flag, then environment/config file, then an
/// interactive hidden prompt (saving the entered key for next time).
fn resolve_api_key(flag: Option<&str>) -> Result<String, ConfigError> {
    if let Some(key) = flag {
        let key = key.trim();
        if !config::is_valid_api_key(key) {
            return Err(ConfigError::InvalidApiKey);
        }
        return Ok(key.to_string());
    }

    if let Some(key) = config::load_api_key()? {
        return Ok(key);
    }

    ui::warning("Gemini API key not found.");
    ui::info("You can get one at https://aistudio.google.com/");

    let key = Password::new()
        .with_prompt("Enter your Gemini API key")
        .interact()
        .map_err(ConfigError::PromptFailed)?;
    let key = key.trim().to_string();

    if !config::is_valid_api_key(&key) {
        return Err(ConfigError::InvalidApiKey);
    }

    config::save_api_key(&key)?;
    ui::success("API key saved.");
    Ok(key)
}

/// Show what will be committed before asking for confirmation.
fn print_plan(operations: &[CommitOperation]) {
    println!();
    println!("Plan:");
    for (position, operation) in operations.iter().enumerate() {
        println!("  [{}/{}] {}", position + 1, operations.len(), operation.message);
        for line in render_tree(&operation.files) {
            println!("        {line}");
        }
    }
    println!();
}
