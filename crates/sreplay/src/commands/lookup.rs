//! `sreplay lookup`: resolve the layout of a table for one quarter

use std::path::PathBuf;

use clap::Args;
use schema_replay_core::period::Period;
use schema_replay_core::versioning::SchemaConfig;

use crate::error::CliError;
use crate::output::{Format, emit, format_schema};

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Schema configuration file written by `discover`
    #[arg(short, long, env = "SREPLAY_SCHEMAS")]
    pub schemas: PathBuf,

    /// Table name
    pub table: String,

    /// Quarter label, e.g. 2014Q3
    pub period: Period,

    /// Print a CREATE TABLE statement for this name instead of the columns
    #[arg(long, value_name = "TABLE_NAME")]
    pub ddl: Option<String>,

    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,
}

/// Handle the `lookup` command
pub fn handle_lookup(args: &LookupArgs) -> Result<(), CliError> {
    let config = SchemaConfig::load(&args.schemas)?;
    let schema = config.lookup(&args.table, args.period)?;

    if let Some(name) = &args.ddl {
        return emit(None, &format!("{};", schema.create_table_sql(name)));
    }

    let text = match args.format {
        Format::Text => {
            let version = config
                .versions(&args.table)
                .iter()
                .find(|v| v.contains(args.period));
            let header = match version {
                Some(v) => format!("{} {} (valid {} - {})\n", args.table, args.period, v.start, v.end),
                None => format!("{} {}\n", args.table, args.period),
            };
            header + &format_schema(schema)
        }
        Format::Json => serde_json::to_string_pretty(schema)
            .map_err(|e| CliError::Output(e.to_string()))?,
        Format::Yaml => serde_yaml::to_string(schema).map_err(|e| CliError::Output(e.to_string()))?,
    };
    emit(None, &text)
}
