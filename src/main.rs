//! Aozora Normalizer CLI - batch normalisation of Aozora Bunko texts.

use anyhow::{Context, Result};
use aozora_normalizer::config::Config;
use aozora_normalizer::console::Console;
use aozora_normalizer::{Normalizer, Pipeline, Workspace, run_batch};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Normalise Aozora Bunko plain-text files into reading text.
#[derive(Parser, Debug)]
#[command(name = "aozora-normalizer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the one in the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the texts to normalise.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory receiving normalised texts.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory receiving processed originals.
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Maximum number of files processed at once.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    jobs: Option<u32>,

    /// Name outputs after the title and author in the header.
    #[arg(long)]
    name_by_title: bool,

    /// Print the batch report as JSON.
    #[arg(long)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Applies command line overrides on top of the loaded config.
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref input) = self.input {
            config.paths.input_directory = input.clone();
        }
        if let Some(ref output) = self.output {
            config.paths.output_directory = output.clone();
        }
        if let Some(ref archive) = self.archive {
            config.paths.archive_directory = Some(archive.clone());
        }
        if let Some(jobs) = self.jobs {
            config.batch.max_concurrent_files = jobs as usize;
        }
        if self.name_by_title {
            config.batch.name_by_title = true;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

/// `--verbose` wins over `RUST_LOG`, which wins over the configured level.
fn log_filter(verbose: bool, configured: &str) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let console = Console::new();

    let mut config = match args.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    // Log events go to stderr so `--json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.verbose, &config.logging.level))
        .with_writer(io::stderr)
        .init();

    if !args.json {
        console.section("Aozora Normalizer");
        console.step("Preparing directories...");
    }

    let workspace = Workspace::from_config(&config);
    workspace
        .provision()
        .await
        .context("Failed to create working directories")?;

    if !args.json {
        console.info(&format!(
            "{} -> {} (originals to {})",
            workspace.input_dir().display(),
            workspace.output_dir().display(),
            workspace.archive_dir().display()
        ));
        console.step("Normalising files...");
    }

    let pipeline = Pipeline::new(workspace, Normalizer::from_config(&config.normalize))
        .with_name_by_title(config.batch.name_by_title);
    let report = run_batch(&pipeline, config.batch.max_concurrent_files)
        .await
        .context("Failed to scan working directories")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        console.report(&report);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
