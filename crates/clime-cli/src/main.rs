mod demo;

use anyhow::{Context, Result};
use clap::Parser;
use clime_core::{Outcome, Program, ProgramOptions, Value};
use std::{fs, path::PathBuf, process::ExitCode};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "clime")]
#[command(version, about = "Run functions described by their signatures", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Program name shown in messages and usage
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Command to run when the first argument names none
    #[arg(long, value_name = "COMMAND")]
    default: Option<String>,

    /// Load program options from a JSON file (flags override it)
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Report failures with their full cause chain
    #[arg(long)]
    debug: bool,

    /// Pass `--help` through to commands untouched
    #[arg(long)]
    ignore_help: bool,

    /// Command name and its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    args: Vec<String>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("clime: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let program = demo::commands()
        .into_iter()
        .fold(Program::new(options), Program::with);

    match program.dispatch(cli.args) {
        Ok(Outcome::Value(Value::None)) => ExitCode::SUCCESS,
        Ok(Outcome::Value(value)) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Usage(usage)) => {
            print!("{usage}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if program.options().debug {
                eprintln!("{}: {err:?}", program.name());
            } else {
                eprintln!("{}: {err:#}", program.name());
            }
            ExitCode::FAILURE
        }
    }
}

fn load_options(cli: &Cli) -> Result<ProgramOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => ProgramOptions::default(),
    };

    if let Some(name) = &cli.name {
        options.name = name.clone();
    }
    if options.name.is_empty() {
        options.name = "clime".to_string();
    }
    if cli.default.is_some() {
        options.default = cli.default.clone();
    }
    options.debug |= cli.debug;
    options.ignore_help |= cli.ignore_help;
    tracing::debug!(?options, "program options");
    Ok(options)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
