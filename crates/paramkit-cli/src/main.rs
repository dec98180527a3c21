//! # paramkit CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paramkit_cli::coerce::{run_coerce, CoerceArgs};
use paramkit_cli::types::{run_types, TypesArgs};
use paramkit_cli::validate::{run_validate, ValidateArgs};

/// Typed parameter objects from schema descriptor files.
///
/// Coerces raw JSON or YAML documents into the declared shape, validates
/// them with the standard rule set, and lists what a set of descriptor
/// files declares.
#[derive(Parser, Debug)]
#[command(name = "paramkit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Coerce a document and print the resulting parameters.
    Coerce(CoerceArgs),

    /// Coerce and validate a document. Exits 1 when invalid.
    Validate(ValidateArgs),

    /// List scalar types and declared schemas.
    Types(TypesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let result = match cli.command {
        Commands::Coerce(args) => run_coerce(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Types(args) => run_types(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
