use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use crudgen_cli::{Orchestrator, RunConfig, RunError};
use crudgen_store::GenerationConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crudgen")]
#[command(version)]
#[command(about = "Generate C# CRUD layers from a declarative entity schema")]
struct Cli {
    /// Log progress at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate a schema and generate every configured artifact.
    Generate(GenerateArgs),
    /// Validate a schema without generating anything.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Schema document (JSON, or YAML with a .yml/.yaml extension).
    #[arg(long)]
    input: PathBuf,
    /// Output root for generated files; overrides the config's `output`.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Generation config (YAML).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema document (JSON, or YAML with a .yml/.yaml extension).
    #[arg(long)]
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => GenerationConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => GenerationConfig::default(),
    };

    let output = args
        .output
        .or_else(|| config.output.clone())
        .ok_or_else(|| "Specify an output directory with --output or in the config".to_string())?;

    let run = RunConfig {
        input: args.input,
        output,
        kinds: config.selected(),
        manifest: config.manifest,
        validate_only: false,
    };

    let report = Orchestrator::run(&run).map_err(describe)?;
    println!(
        "Generated {} files for {} entities of project '{}' in {}",
        report.written.len(),
        report.entities,
        report.project,
        run.output.display()
    );
    if let Some(manifest) = report.manifest {
        println!("Manifest: {}", manifest.display());
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let run = RunConfig {
        validate_only: true,
        ..RunConfig::new(args.input, PathBuf::new())
    };
    let report = Orchestrator::run(&run).map_err(describe)?;
    println!(
        "Project '{}' is valid ({} entities)",
        report.project, report.entities
    );
    Ok(())
}

/// Error text for the `error:` line; diagnostics follow one per line.
fn describe(err: RunError) -> String {
    match &err {
        RunError::Invalid(diagnostics) => {
            let mut message = err.to_string();
            for diagnostic in diagnostics {
                message.push_str(&format!("\n  {diagnostic}"));
            }
            message
        }
        _ => err.to_string(),
    }
}
