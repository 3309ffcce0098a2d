//! dirdocs — AI-generated per-folder documentation for project trees.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use dirdocs::cancel;
use dirdocs::config;
use dirdocs::constants;
use dirdocs::env;
use dirdocs::orchestrator;
use dirdocs::progress;
use dirdocs::providers;
use dirdocs::scan;
use dirdocs::status;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;

use cancel::CancelFlag;
use cli::args::{Cli, Command, GenerateArgs, StatusArgs, WorkspaceArgs};
use config::Config;
use env::Env;
use orchestrator::DocOrchestrator;
use progress::ProgressReporter;
use providers::rig::RigProvider;
use scan::{IgnoreFilter, flatten};
use status::StatusMap;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::Status(args) => run_status(args),
        Command::Models(args) => run_models(args).await,
        Command::Config(args) => run_config(args),
        Command::Version => run_version(),
    }
}

/// Run documentation generation over the workspace.
async fn run_generate(args: GenerateArgs) -> Result<()> {
    let mut config = Config::load(Some(&args.path), &Env::real())
        .context("failed to load configuration")?;
    if let Some(model) = args.model.clone() {
        config.provider.model = Some(model);
    }

    let provider = RigProvider::new(config.provider.clone())
        .context("failed to initialize the LLM provider")?;

    let mode = args.run_mode();
    let mut orch = DocOrchestrator::new(
        args.path.clone(),
        config,
        Arc::new(provider),
        ProgressReporter::new(!args.no_progress),
    );

    // Ctrl+C requests cancellation; the run stops before the next folder.
    let cancel = CancelFlag::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancellation requested, finishing current folder...");
            signal_cancel.request();
        }
    });

    let outcome = orch.run(mode, &cancel).await?;

    if outcome.failed > 0 {
        bail!(
            "{} of {} folder(s) failed; fallback documents were written",
            outcome.failed,
            outcome.processed
        );
    }
    Ok(())
}

/// Show per-folder freshness without touching any file.
fn run_status(args: StatusArgs) -> Result<()> {
    let config = Config::load(Some(&args.path), &Env::real())
        .context("failed to load configuration")?;

    let filter = IgnoreFilter::new(&config.ignore);
    let tree = scan::build_tree(&args.path, &filter)?;
    let folders = flatten(&tree);
    let snapshot = status::snapshot(&args.path, &folders, &StatusMap::new());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut fresh = 0;
    let mut stale = 0;
    let mut missing = 0;
    for item in &snapshot.items {
        let label = if item.relative_path.is_empty() {
            "."
        } else {
            item.relative_path.as_str()
        };
        if !item.details.has_output_file {
            missing += 1;
            println!("  {} {}", "✗".red(), label);
        } else if item.details.is_up_to_date {
            fresh += 1;
            println!("  {} {}", "✓".green(), label);
        } else {
            stale += 1;
            println!("  {} {} {}", "!".yellow(), label, "(stale)".dimmed());
        }
    }
    println!(
        "\n{} folder(s): {} up to date, {} stale, {} undocumented",
        snapshot.total, fresh, stale, missing
    );
    Ok(())
}

/// List the models available for selection.
async fn run_models(args: WorkspaceArgs) -> Result<()> {
    let config = Config::load(Some(&args.path), &Env::real())
        .context("failed to load configuration")?;
    let selected = config.provider.model.clone();

    let models = match RigProvider::new(config.provider.clone()) {
        Ok(provider) => {
            use providers::ChatProvider;
            provider
                .list_models()
                .await
                .unwrap_or_else(|_| config.provider.models.clone())
        }
        // No API key is fine for listing; fall back to the configured catalog.
        Err(_) => config.provider.models.clone(),
    };

    if models.is_empty() {
        println!(
            "No models configured. Add [[provider.models]] entries to {} or set a model id.",
            constants::CONFIG_FILENAME
        );
        return Ok(());
    }

    for model in &models {
        let marker = if selected.as_deref() == Some(model.id.as_str()) {
            "*".green().bold().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{marker} {}  {}",
            model.id.bold(),
            format!("{} · {} · {}", model.name, model.family, model.vendor).dimmed()
        );
    }
    Ok(())
}

/// Print the effective configuration after layering, key redacted.
fn run_config(args: WorkspaceArgs) -> Result<()> {
    let mut config = Config::load(Some(&args.path), &Env::real())
        .context("failed to load configuration")?;
    config.provider.api_key = config.provider.api_key.map(|_| "[REDACTED]".to_string());

    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn run_version() -> Result<()> {
    println!("{} {}", constants::APP_NAME.bold(), constants::VERSION.green().bold());
    Ok(())
}
