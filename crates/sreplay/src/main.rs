//! sreplay - quarterly schema discovery and resilient SQL script replay

mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::discover::{DiscoverArgs, handle_discover};
use commands::lookup::{LookupArgs, handle_lookup};
use commands::run::{RunArgs, handle_run};
use commands::split::{SplitArgs, handle_split};

#[derive(Parser, Debug)]
#[command(name = "sreplay")]
#[command(version)]
#[command(about = "Versioned schema inference for quarterly extracts and fault-tolerant SQL replay", long_about = None)]
struct Cli {
    /// Log debug output (SREPLAY_LOG and RUST_LOG take precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Infer versioned table layouts from a directory of quarterly extracts
    Discover(DiscoverArgs),
    /// Show the layout of a table for one quarter
    Lookup(LookupArgs),
    /// Split a SQL script into statements without running it
    Split(SplitArgs),
    /// Replay a SQL script statement by statement
    Run(RunArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match &cli.command {
        Command::Discover(args) => handle_discover(args).map(|()| ExitCode::SUCCESS),
        Command::Lookup(args) => handle_lookup(args).map(|()| ExitCode::SUCCESS),
        Command::Split(args) => handle_split(args).map(|()| ExitCode::SUCCESS),
        Command::Run(args) => handle_run(args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
