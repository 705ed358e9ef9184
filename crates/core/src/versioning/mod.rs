//! Versioned table schemas for quarterly extracts
//!
//! Column layouts drift between quarterly releases. This module groups the
//! layout inferred for every (table, period) into [`SchemaVersion`]s with
//! contiguous validity windows, and resolves "which layout applies to period
//! X" at load time.
//!
//! # Example
//!
//! ```rust
//! use schema_replay_core::inference::ColumnType;
//! use schema_replay_core::period::Period;
//! use schema_replay_core::versioning::{ColumnSchema, lookup, resolve};
//!
//! let v1: ColumnSchema = [("primaryid", ColumnType::BigInt)].into_iter().collect();
//! let v2: ColumnSchema = [("primaryid", ColumnType::BigInt), ("age", ColumnType::Float)]
//!     .into_iter()
//!     .collect();
//!
//! let versions = resolve(
//!     "demo",
//!     vec![
//!         ("2012Q4".parse().unwrap(), v1.clone()),
//!         ("2013Q1".parse().unwrap(), v1),
//!         ("2014Q1".parse().unwrap(), v2.clone()),
//!     ],
//! );
//!
//! let current = lookup("demo", &versions, Period::new(2030, 1).unwrap()).unwrap();
//! assert_eq!(current, &v2);
//! ```

mod error;
mod resolver;
mod schema;
mod store;

pub use error::VersionError;
pub use resolver::{lookup, resolve};
pub use schema::{ColumnSchema, SchemaVersion};
pub use store::SchemaConfig;
