//! Error returned when a run stops at a fatal statement

use thiserror::Error;

use super::connection::DbError;
use super::outcome::RunReport;

/// A statement failed fatally and the rest of the script was not attempted
///
/// The report holds every outcome up to and including the fatal one.
#[derive(Error, Debug)]
#[error("Statement {index} (line {line}) failed: {error}")]
pub struct ExecutionHalted {
    pub report: Box<RunReport>,
    /// 0-based index of the failing statement
    pub index: usize,
    pub line: usize,
    #[source]
    pub error: DbError,
}

impl ExecutionHalted {
    /// Get a user-friendly message with a hint
    pub fn user_message(&self) -> String {
        let mut message = format!(
            "Statement {} at line {} failed and the run was stopped.\n{}",
            self.index + 1,
            self.line,
            self.error.message
        );
        if let Some(code) = &self.error.code {
            message.push_str(&format!(" (SQLSTATE {code})"));
        }
        message.push_str(&format!(
            "\nHint: {} earlier statement(s) stay committed; fix the statement and rerun, \
             objects that already exist are skipped.",
            self.report
                .outcomes
                .iter()
                .filter(|o| o.status.is_success())
                .count()
        ));
        message
    }
}
