//! Per-statement outcomes and the run report

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::script::{Statement, StatementKind};

/// Result of executing one statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Committed,
    /// The target already existed; counted as success
    SkippedIdempotent,
    /// Transient errors exhausted the retry budget; the run continued
    FailedRecoverable,
    /// The run stopped at this statement
    FailedFatal,
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OutcomeStatus::Committed | OutcomeStatus::SkippedIdempotent
        )
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Committed => f.write_str("committed"),
            OutcomeStatus::SkippedIdempotent => f.write_str("skipped-idempotent"),
            OutcomeStatus::FailedRecoverable => f.write_str("failed-recoverable"),
            OutcomeStatus::FailedFatal => f.write_str("failed-fatal"),
        }
    }
}

/// One record of the outcome stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// 0-based position in the statement sequence
    pub index: usize,
    /// Source line the statement starts on
    pub line: usize,
    pub kind: StatementKind,
    pub preview: String,
    pub status: OutcomeStatus,
    pub attempts: u32,
    /// Message of the error behind a skip or failure
    pub last_error: Option<String>,
    pub error_code: Option<String>,
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    pub(crate) fn for_statement(index: usize, statement: &Statement) -> Self {
        Self {
            index,
            line: statement.line,
            kind: statement.kind,
            preview: statement.preview(),
            status: OutcomeStatus::Committed,
            attempts: 0,
            last_error: None,
            error_code: None,
            duration_ms: 0,
        }
    }
}

/// Outcomes of one script run, in statement order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// SHA-256 of the script text, when the run came from a file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_sha256: Option<String>,
    pub outcomes: Vec<ExecutionOutcome>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            script_sha256: None,
            outcomes: Vec::new(),
        }
    }

    /// Record the digest of the script the statements came from
    pub fn with_script(mut self, raw: &str) -> Self {
        self.script_sha256 = Some(format!("{:x}", Sha256::digest(raw.as_bytes())));
        self
    }

    pub(crate) fn push(&mut self, outcome: ExecutionOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of outcomes with the given status
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn has_fatal(&self) -> bool {
        self.count(OutcomeStatus::FailedFatal) > 0
    }

    pub fn has_recoverable_failures(&self) -> bool {
        self.count(OutcomeStatus::FailedRecoverable) > 0
    }

    /// Process exit code: non-zero only when a statement failed fatally
    ///
    /// Recoverable failures alone still exit 0; downstream scripts tolerate
    /// best-effort statement loss.
    pub fn exit_code(&self) -> i32 {
        if self.has_fatal() { 1 } else { 0 }
    }

    /// Wall-clock duration, once finished
    pub fn duration_ms(&self) -> Option<u64> {
        self.finished_at.map(|end| {
            u64::try_from((end - self.started_at).num_milliseconds()).unwrap_or_default()
        })
    }

    /// Render the outcome stream as JSON lines
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for outcome in &self.outcomes {
            out.push_str(&serde_json::to_string(outcome)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// One-line summary of the counts
    pub fn summary(&self) -> String {
        format!(
            "{} statement(s): {} committed, {} skipped (already exist), {} failed (recoverable), {} failed (fatal)",
            self.outcomes.len(),
            self.count(OutcomeStatus::Committed),
            self.count(OutcomeStatus::SkippedIdempotent),
            self.count(OutcomeStatus::FailedRecoverable),
            self.count(OutcomeStatus::FailedFatal),
        )
    }
}
