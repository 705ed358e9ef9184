//! `sreplay split`: show how a script will be cut into statements

use std::path::PathBuf;

use clap::Args;
use schema_replay_core::script::split;

use crate::error::CliError;
use crate::output::{Format, emit, format_split};

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// SQL script to split
    pub script: PathBuf,

    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,

    /// Output file (stdout if not provided)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the `split` command
pub fn handle_split(args: &SplitArgs) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(&args.script).map_err(|e| CliError::io(&args.script, e))?;
    let script = split(&raw);

    eprintln!(
        "{}: {} statement(s), {} meta-command(s)",
        args.script.display(),
        script.len(),
        script.manual_commands.len()
    );

    let text = match args.format {
        Format::Text => format_split(&script),
        Format::Json => {
            serde_json::to_string_pretty(&script).map_err(|e| CliError::Output(e.to_string()))?
        }
        Format::Yaml => {
            serde_yaml::to_string(&script).map_err(|e| CliError::Output(e.to_string()))?
        }
    };
    emit(args.output.as_deref(), &text)
}
