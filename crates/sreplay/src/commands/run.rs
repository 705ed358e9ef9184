//! `sreplay run`: replay a script against the configured database

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Args;
use schema_replay_core::config::ReplayConfig;
use schema_replay_core::database;
use schema_replay_core::executor::{ResilientExecutor, RetryPolicy, RunReport, verify_tables};
use schema_replay_core::script::split;
use tracing::{info_span, warn};

use crate::error::CliError;
use crate::output::{emit, print_checks, print_report};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// SQL script to replay
    pub script: PathBuf,

    /// Replay configuration (TOML)
    #[arg(short, long, env = "SREPLAY_CONFIG", default_value = "sreplay.toml")]
    pub config: PathBuf,

    /// Write the outcome stream as JSON lines to this file
    #[arg(long)]
    pub outcomes: Option<PathBuf>,

    /// Override retry.max_attempts
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_attempts: Option<u32>,

    /// Override retry.delay_secs
    #[arg(long)]
    pub retry_delay: Option<u64>,

    /// Skip the row-count verification of [verify] tables
    #[arg(long)]
    pub no_verify: bool,
}

/// Handle the `run` command
///
/// Exits non-zero only when a statement failed fatally. Statements that
/// exhausted their retries are reported but do not fail the run.
pub fn handle_run(args: &RunArgs) -> Result<ExitCode, CliError> {
    let config = ReplayConfig::load(&args.config)?;

    let mut policy = RetryPolicy::from(&config.retry);
    if let Some(max_attempts) = args.max_attempts {
        policy.max_attempts = max_attempts;
    }
    if let Some(delay) = args.retry_delay {
        policy.delay = Duration::from_secs(delay);
    }

    let raw = std::fs::read_to_string(&args.script).map_err(|e| CliError::io(&args.script, e))?;
    let script = split(&raw);
    if script.requires_manual_steps() {
        eprintln!("Warning: meta-commands skipped, run them manually:");
        for command in &script.manual_commands {
            eprintln!("  {command}");
        }
    }
    if script.is_empty() {
        eprintln!("{}: no statements to run", args.script.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut conn = database::connect(&config.database)?;

    let span = info_span!("replay", script = %args.script.display(), backend = %config.database.backend);
    let result = ResilientExecutor::new(&mut conn, policy)
        .with_span(span)
        .run_into(RunReport::new().with_script(&raw), script.statements);

    let report = match &result {
        Ok(report) => report,
        Err(halted) => halted.report.as_ref(),
    };
    if let Some(path) = &args.outcomes {
        let lines = report
            .to_json_lines()
            .map_err(|e| CliError::Output(e.to_string()))?;
        emit(Some(path), &lines)?;
    }
    print_report(report);

    let report = result.map_err(Box::new)?;

    if report.has_recoverable_failures() {
        warn!(
            failed = report.outcomes.iter().filter(|o| !o.status.is_success()).count(),
            "Some statements failed after retries; the run continued"
        );
    }

    if !args.no_verify && !config.verify.tables.is_empty() {
        let checks = verify_tables(
            &mut conn,
            config.database.schema.as_deref(),
            config.verify.tables.as_slice(),
        );
        print_checks(&checks);
    }

    Ok(ExitCode::from(u8::try_from(report.exit_code()).unwrap_or(1)))
}
