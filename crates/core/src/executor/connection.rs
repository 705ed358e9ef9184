//! Database connection seam and error classification

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the executor reacts to a failed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorClass {
    /// The object already exists; replaying the statement is a no-op
    IdempotentConflict,
    /// Connection-level or resource failure that may succeed on retry
    Transient,
    /// Syntax error, constraint violation, or anything else
    Fatal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::IdempotentConflict => f.write_str("idempotent-conflict"),
            ErrorClass::Transient => f.write_str("transient"),
            ErrorClass::Fatal => f.write_str("fatal"),
        }
    }
}

/// Error returned by a [`SqlConnection`], already classified
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DbError {
    pub class: ErrorClass,
    /// Engine error code (SQLSTATE for Postgres), when the engine has one
    pub code: Option<String>,
    pub message: String,
}

impl DbError {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            code: None,
            message: message.into(),
        }
    }

    pub fn idempotent(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::IdempotentConflict, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Transient, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Fatal, message)
    }

    /// Build an error from a Postgres SQLSTATE code
    pub fn from_sqlstate(code: &str, message: impl Into<String>) -> Self {
        Self {
            class: classify_sqlstate(code),
            code: Some(code.to_string()),
            message: message.into(),
        }
    }

    /// Build an error classified from its message text
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(classify_message(&message), message)
    }
}

/// A database connection the executor can drive one statement at a time
///
/// Implementations classify their own errors. The executor brackets each
/// statement with `begin`/`commit`, and calls `rollback` after a failure.
pub trait SqlConnection {
    /// Open a transaction scope for the next statement
    fn begin(&mut self) -> Result<(), DbError>;

    /// Execute one statement; results are discarded
    fn execute(&mut self, sql: &str) -> Result<(), DbError>;

    /// Commit the current scope
    fn commit(&mut self) -> Result<(), DbError>;

    /// Discard the current scope
    fn rollback(&mut self) -> Result<(), DbError>;

    /// Row count of a table, or `None` when it does not exist
    fn row_count(&mut self, schema: Option<&str>, table: &str) -> Result<Option<i64>, DbError>;
}

impl<C: SqlConnection + ?Sized> SqlConnection for Box<C> {
    fn begin(&mut self) -> Result<(), DbError> {
        (**self).begin()
    }

    fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        (**self).execute(sql)
    }

    fn commit(&mut self) -> Result<(), DbError> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        (**self).rollback()
    }

    fn row_count(&mut self, schema: Option<&str>, table: &str) -> Result<Option<i64>, DbError> {
        (**self).row_count(schema, table)
    }
}

/// SQLSTATE codes meaning "object already exists"
const IDEMPOTENT_SQLSTATES: &[&str] = &[
    "42P04", // duplicate_database
    "42P06", // duplicate_schema
    "42P07", // duplicate_table
    "42701", // duplicate_column
    "42710", // duplicate_object
    "42723", // duplicate_function
];

/// SQLSTATE codes for temporary conditions
const TRANSIENT_SQLSTATES: &[&str] = &[
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "57014", // query_canceled (statement timeout)
    "57P01", // admin_shutdown
    "57P02", // crash_shutdown
    "57P03", // cannot_connect_now
    "58030", // io_error
];

/// SQLSTATE classes for temporary conditions
const TRANSIENT_SQLSTATE_CLASSES: &[&str] = &[
    "08", // connection_exception
    "53", // insufficient_resources
];

/// Classify a Postgres SQLSTATE code
pub fn classify_sqlstate(code: &str) -> ErrorClass {
    let code = code.trim().to_uppercase();
    if IDEMPOTENT_SQLSTATES.contains(&code.as_str()) {
        ErrorClass::IdempotentConflict
    } else if TRANSIENT_SQLSTATES.contains(&code.as_str())
        || TRANSIENT_SQLSTATE_CLASSES
            .iter()
            .any(|class| code.starts_with(class))
    {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}

/// Message fragments of transient failures, for engines without codes
const TRANSIENT_MESSAGE_HINTS: &[&str] = &[
    "could not connect",
    "connection refused",
    "connection reset",
    "connection timed out",
    "broken pipe",
    "timed out",
    "database is locked",
    "deadlock",
    "too many connections",
    "server closed the connection",
    "io error",
];

/// Classify an error from its message text
pub fn classify_message(message: &str) -> ErrorClass {
    let message = message.to_lowercase();
    if message.contains("already exists") {
        ErrorClass::IdempotentConflict
    } else if TRANSIENT_MESSAGE_HINTS
        .iter()
        .any(|hint| message.contains(hint))
    {
        ErrorClass::Transient
    } else {
        ErrorClass::Fatal
    }
}
