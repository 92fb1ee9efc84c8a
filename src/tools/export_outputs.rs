//! Export Outputs (Developer Tool)
//!
//! Reads a `serverless.yml`, validates the resources listed under
//! `custom.exportResources`, and prints the service's `resources.Outputs`
//! with the ARN and description exports added.
//!
//! Logs go to stderr (filter with `RUST_LOG`); stdout carries only the outputs.
//!
//! ```bash
//! export-outputs --config serverless.yml --stage prod --format yaml
//! ```
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sls_export_resources::{ServiceDefinition, run};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(
    name = "export-outputs",
    about = "Adds ARN and description exports for Serverless functions and state machines"
)]
struct Args {
    /// Service definition to read
    #[arg(short, long, default_value = "serverless.yml")]
    config: PathBuf,

    /// Stage to deploy, overriding `provider.stage`
    #[arg(short, long)]
    stage: Option<String>,

    /// Format of the printed outputs
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write the outputs to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();

    let mut service = ServiceDefinition::from_path(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    if let Some(stage) = args.stage {
        service = service.with_stage(stage);
    }

    let outputs = run(&service)?;

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outputs)?,
        OutputFormat::Yaml => serde_yaml::to_string(&outputs)?,
    };

    match args.output {
        Some(path) => std::fs::write(&path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}
