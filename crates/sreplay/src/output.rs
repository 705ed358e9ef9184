//! Output formatting for CLI

use std::path::Path;

use schema_replay_core::executor::{ExecutionOutcome, OutcomeStatus, RunReport, TableCheck};
use schema_replay_core::script::SplitScript;
use schema_replay_core::versioning::ColumnSchema;

use crate::error::CliError;

/// Serialization format for structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Yaml,
    Text,
}

/// Write `content` to `path`, or to stdout without one
pub fn emit(path: Option<&Path>, content: &str) -> Result<(), CliError> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
                }
            }
            std::fs::write(path, content).map_err(|e| CliError::io(path, e))
        }
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Columns of a layout, one per line, names padded to align types
pub fn format_schema(schema: &ColumnSchema) -> String {
    let width = schema.names().map(str::len).max().unwrap_or(0);
    let mut out = String::new();
    for (name, ty) in schema.iter() {
        out.push_str(&format!("  {name:<width$}  {ty}\n"));
    }
    out
}

/// Statements of a split script in reading order
pub fn format_split(script: &SplitScript) -> String {
    let mut out = String::new();
    for (index, statement) in script.statements.iter().enumerate() {
        out.push_str(&format!(
            "[{}] line {} ({})\n{}\n\n",
            index + 1,
            statement.line,
            statement.kind,
            statement.text
        ));
    }
    if script.requires_manual_steps() {
        out.push_str("Meta-commands to run manually:\n");
        for command in &script.manual_commands {
            out.push_str(&format!("  {command}\n"));
        }
    }
    out
}

fn status_marker(status: OutcomeStatus) -> &'static str {
    match status {
        OutcomeStatus::Committed => "ok",
        OutcomeStatus::SkippedIdempotent => "skip",
        OutcomeStatus::FailedRecoverable => "FAIL",
        OutcomeStatus::FailedFatal => "FATAL",
    }
}

/// One human-readable line per outcome
pub fn format_outcome(outcome: &ExecutionOutcome) -> String {
    let mut line = format!(
        "{:>5}  #{:<4} line {:<5} {}",
        status_marker(outcome.status),
        outcome.index + 1,
        outcome.line,
        outcome.preview
    );
    if outcome.attempts > 1 {
        line.push_str(&format!(" [{} attempts]", outcome.attempts));
    }
    if !outcome.status.is_success() {
        if let Some(error) = &outcome.last_error {
            line.push_str(&format!("\n       {error}"));
        }
    }
    line
}

/// Print the run outcome to stderr
pub fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        eprintln!("{}", format_outcome(outcome));
    }
    eprintln!();
    eprintln!("Run {}: {}", report.run_id, report.summary());
    if let Some(ms) = report.duration_ms() {
        eprintln!("Duration: {ms} ms");
    }
}

/// Print verification results to stderr
pub fn print_checks(checks: &[TableCheck]) {
    eprintln!();
    eprintln!("Verification:");
    for check in checks {
        eprintln!("  {:<24} {}", check.table, check.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_replay_core::inference::ColumnType;
    use schema_replay_core::script::split;

    #[test]
    fn test_format_schema_aligns_types() {
        let schema: ColumnSchema = [("primaryid", ColumnType::BigInt), ("sex", ColumnType::Varchar(10))]
            .into_iter()
            .collect();
        assert_eq!(format_schema(&schema), "  primaryid  bigint\n  sex        varchar(10)\n");
    }

    #[test]
    fn test_format_split_lists_manual_commands() {
        let text = format_split(&split("SELECT 1;\n\\copy demo FROM 'x'\n"));
        assert!(text.starts_with("[1] line 1 (plain)\nSELECT 1\n"));
        assert!(text.contains("line 2: \\copy demo FROM 'x'"));
    }

    #[test]
    fn test_emit_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("outcomes.jsonl");
        emit(Some(&path), "{}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}\n");
    }
}
