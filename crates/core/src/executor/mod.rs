//! Resilient replay of split SQL scripts
//!
//! Statements run strictly in order on one connection. Each statement gets
//! its own transaction scope and a retry budget for transient errors:
//!
//! - "already exists" conflicts count as success (`skipped-idempotent`)
//! - transient errors are retried with a fixed delay, then recorded as
//!   `failed-recoverable` while the run moves on
//! - any other error is `failed-fatal` and stops the run
//!
//! # Example
//!
//! ```rust,ignore
//! use schema_replay_core::executor::{ResilientExecutor, RetryPolicy};
//! use schema_replay_core::script::split;
//!
//! let script = split(&std::fs::read_to_string("load.sql")?);
//! let report = ResilientExecutor::new(&mut conn, RetryPolicy::default())
//!     .run(script.statements)?;
//! println!("{}", report.summary());
//! ```

mod connection;
mod error;
mod outcome;
mod policy;
mod runner;
mod verify;

pub use connection::{DbError, ErrorClass, SqlConnection, classify_message, classify_sqlstate};
pub use error::ExecutionHalted;
pub use outcome::{ExecutionOutcome, OutcomeStatus, RunReport};
pub use policy::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy, Sleeper, ThreadSleeper};
pub use runner::ResilientExecutor;
pub use verify::{TableCheck, TableStatus, verify_tables};
