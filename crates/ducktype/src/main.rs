//! ducktype CLI

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ducktype_core::{
    analyze_source, render, Diagnostic, DiagnosticKind, InferenceConfig, ModuleReport,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ducktype")]
#[command(version)]
#[command(about = "Structural type inference and duck-typing checks for Python modules")]
struct Cli {
    /// Python files to analyse
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Inference configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the inferred type of every module-level binding
    #[arg(long)]
    types: bool,

    /// Emit one JSON report per file instead of text
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Outcome over all files
enum Outcome {
    Clean,
    Diagnostics,
}

#[derive(Serialize)]
struct JsonBinding<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    path: String,
    bindings: Vec<JsonBinding<'a>>,
    diagnostics: &'a [Diagnostic],
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Diagnostics) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<InferenceConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            InferenceConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(InferenceConfig::default()),
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = load_config(cli.config.as_deref())?;
    debug!("Inference configuration: {:?}", config);

    let mut outcome = Outcome::Clean;
    for file in &cli.files {
        let source = std::fs::read_to_string(file)
            .with_context(|| format!("reading {}", file.display()))?;
        let path = file.display().to_string();
        let report = analyze_source(&source, &path, &config)?;

        if cli.json {
            print_json(&path, &report)?;
        } else {
            print_text(&path, &report, cli.types);
        }
        if report.has_diagnostics() {
            outcome = Outcome::Diagnostics;
        }
    }
    Ok(outcome)
}

fn print_text(path: &str, report: &ModuleReport, types: bool) {
    if types {
        for (name, ty) in &report.bindings {
            println!("{} :: {}", name.bold(), render(ty));
        }
    }
    for diagnostic in &report.diagnostics {
        let message = match diagnostic.kind {
            DiagnosticKind::AttributeError => diagnostic.message.yellow(),
            DiagnosticKind::TypeError => diagnostic.message.red(),
        };
        println!("{}:{}: {}", path, diagnostic.line, message);
    }
}

fn print_json(path: &str, report: &ModuleReport) -> Result<()> {
    let json = JsonReport {
        path: path.to_string(),
        bindings: report
            .bindings
            .iter()
            .map(|(name, ty)| JsonBinding { name, ty: render(ty) })
            .collect(),
        diagnostics: &report.diagnostics,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
