//! iso16 - ISO-16 conformance runner
//!
//! Runs conformance vectors through the true-delivery loop, compares the
//! results with expected outputs, and prints seals.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// iso16 - ISO-16 conformance runner
#[derive(Parser, Debug)]
#[command(name = "iso16")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to runner configuration file (defaults to ./iso16.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one vector and compare it with its expected output
    Run(commands::run::RunArgs),

    /// Run one vector and print its outcome and seal
    Seal(commands::seal::SealArgs),

    /// Run every vector in a directory
    Suite(commands::suite::SuiteArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results only.
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let defaults = commands::load_metadata(cli.config.as_deref())?;

    let exit_code = match cli.command {
        Commands::Run(args) => commands::run::run_check(&args, &defaults),
        Commands::Seal(args) => commands::seal::run_seal(&args, &defaults),
        Commands::Suite(args) => commands::suite::run_suite(&args, &defaults),
    };
    std::process::exit(i32::from(exit_code));
}
