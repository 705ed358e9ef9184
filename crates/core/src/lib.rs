//! Schema Replay Core - versioned schema inference and resilient SQL replay
//!
//! Provides:
//! - Column type inference from sampled raw values
//! - Grouping of per-quarter layouts into non-overlapping schema versions
//! - Splitting of SQL scripts, keeping procedural blocks whole
//! - Statement-by-statement replay with retry and idempotent-conflict handling
//! - Discovery of quarterly extract files (feature `discovery`)
//! - PostgreSQL and DuckDB backends (features `postgres-backend`, `duckdb-backend`)

pub mod config;
pub mod database;
#[cfg(feature = "discovery")]
pub mod discovery;
pub mod executor;
pub mod inference;
pub mod period;
pub mod script;
pub mod versioning;

// Re-export commonly used types
pub use config::{Backend, ConfigError, DatabaseConfig, ReplayConfig, RetryConfig, VerifyConfig};
#[cfg(feature = "discovery")]
pub use discovery::{DiscoveryConfig, DiscoveryError, DiscoveryReport, discover};
pub use executor::{
    DbError, ErrorClass, ExecutionHalted, ExecutionOutcome, OutcomeStatus, ResilientExecutor,
    RetryPolicy, RunReport, SqlConnection, TableCheck, TableStatus, verify_tables,
};
pub use inference::{ColumnType, InferenceConfig, infer, infer_with_config};
pub use period::{OPEN_ENDED_LABEL, Period, PeriodError, ValidityEnd};
pub use script::{SplitScript, Statement, StatementKind, split};
pub use versioning::{ColumnSchema, SchemaConfig, SchemaVersion, VersionError, lookup, resolve};
