//! Executable statements produced by the splitter

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Statements Postgres refuses to run inside a transaction block
static NON_TRANSACTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(VACUUM\b|CREATE\s+DATABASE\b|DROP\s+DATABASE\b|ALTER\s+SYSTEM\b|CREATE\s+(UNIQUE\s+)?INDEX\s+CONCURRENTLY\b|DROP\s+INDEX\s+CONCURRENTLY\b)",
    )
    .unwrap()
});

const PREVIEW_CHARS: usize = 80;

/// How a statement was delimited in the source script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Ended by a terminator; the terminator is stripped
    Plain,
    /// A dollar-quoted body (`DO $$ ... $$;`), kept verbatim
    ProceduralBlock,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Plain => f.write_str("plain"),
            StatementKind::ProceduralBlock => f.write_str("procedural-block"),
        }
    }
}

/// One independently executable unit of SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Trimmed SQL text
    pub text: String,
    pub kind: StatementKind,
    /// 1-based line the statement starts on
    pub line: usize,
}

impl Statement {
    pub fn new(text: impl Into<String>, kind: StatementKind, line: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            line,
        }
    }

    /// First line of the statement, shortened for log output
    pub fn preview(&self) -> String {
        let first = self.text.lines().next().unwrap_or_default();
        if first.chars().count() > PREVIEW_CHARS {
            let cut: String = first.chars().take(PREVIEW_CHARS).collect();
            format!("{cut}...")
        } else if self.text.contains('\n') {
            format!("{first} ...")
        } else {
            first.to_string()
        }
    }

    /// Whether the statement must run outside a transaction scope
    pub fn runs_outside_transaction(&self) -> bool {
        self.kind == StatementKind::Plain && NON_TRANSACTIONAL.is_match(&self.text)
    }
}

/// A client-side meta-command (`\copy`, `\i`, ...) dropped from the script
///
/// These only work in an interactive client and have to be run by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaCommand {
    pub line: usize,
    pub text: String,
}

impl fmt::Display for MetaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.text)
    }
}

/// Output of splitting one script
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitScript {
    /// Statements in source order
    pub statements: Vec<Statement>,
    /// Meta-commands that require manual execution
    pub manual_commands: Vec<MetaCommand>,
}

impl SplitScript {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn requires_manual_steps(&self) -> bool {
        !self.manual_commands.is_empty()
    }
}
