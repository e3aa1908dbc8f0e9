//! hulma — render templates from the command line.
//!
//! # Usage
//!
//! ```text
//! hulma render --template <path>... [--template-data <json>]... [--data <path>]
//!              [--name <template>] [--output <path>|stdout]
//! hulma compile <path> [--name <name>] [--output <path>]
//! ```

mod builtins;
mod commands;
mod loader;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{compile::CompileArgs, render::RenderArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hulma",
    version,
    about = "Render hulma templates against JSON or YAML data",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register templates and render one of them.
    Render(RenderArgs),

    /// Compile a markup template into its persisted JSON document.
    Compile(CompileArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Compile(args) => args.run(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
