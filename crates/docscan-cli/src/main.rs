// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docscan — command-line document scanner
//
// Entry point. Initialises logging, parses arguments, runs one scan, and writes
// the requested stage artifacts as PNG files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docscan_core::human_errors::humanize_error;
use docscan_core::{ScanConfig, ScanError, Stage};
use docscan_document::ScanPipeline;

#[derive(Debug, Parser)]
#[command(name = "docscan", version, about = "Detect, flatten, and binarize a photographed page")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan one image and write its stage artifacts.
    Scan {
        /// Photo of a document (any format the image crate decodes).
        input: PathBuf,

        /// Directory for the PNG artifacts.
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// JSON configuration; omitted fields take their defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stage to write (repeatable). Writes every stage when absent.
        #[arg(long = "stage", value_name = "NAME")]
        stages: Vec<Stage>,
    },
    /// Print the default configuration as JSON.
    Config,
}

/// Exit code for an input that could not be decoded.
const EXIT_LOAD_FAILURE: u8 = 2;
/// Exit code for a photo with no detectable page.
const EXIT_NO_DOCUMENT: u8 = 3;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scan {
            input,
            out_dir,
            config,
            stages,
        } => scan(&input, &out_dir, config.as_deref(), &stages),
        Command::Config => {
            let json = serde_json::to_string_pretty(&ScanConfig::default())
                .context("serialising default configuration")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn scan(input: &Path, out_dir: &Path, config: Option<&Path>, stages: &[Stage]) -> Result<()> {
    let config = match config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ScanConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ScanConfig::default(),
    };
    let pipeline = ScanPipeline::new(config).context("invalid configuration")?;

    tracing::info!(input = %input.display(), "Docscan starting");
    let result = pipeline.scan_path(input)?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scan".into());
    let stages: &[Stage] = if stages.is_empty() { &Stage::ALL } else { stages };
    let written = result
        .save_stages(out_dir, &stem, stages)
        .with_context(|| format!("writing artifacts to {}", out_dir.display()))?;

    for path in &written {
        println!("{}", path.display());
    }
    tracing::info!(count = written.len(), "Artifacts written");
    Ok(())
}

/// Print a failure and pick its exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ScanError>() {
        Some(scan_err) => {
            let human = humanize_error(scan_err);
            tracing::error!(error = %scan_err, "Scan failed");
            eprintln!("{}\n{}", human.message, human.suggestion);
            match scan_err {
                ScanError::LoadFailure(_) => ExitCode::from(EXIT_LOAD_FAILURE),
                ScanError::NoDocumentFound(_) => ExitCode::from(EXIT_NO_DOCUMENT),
            }
        }
        None => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
