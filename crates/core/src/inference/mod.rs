//! Column type inference for delimited quarterly extracts
//!
//! Infers a SQL column type from a bounded sample of raw string values.
//!
//! ## Rules
//!
//! - Null and empty values are ignored for type and length tracking
//! - **bigint** when every remaining value is a canonical integer
//!   (no leading zeros, no `+` sign)
//! - **float(24)** when every remaining value is a finite decimal number
//! - **varchar(N)** otherwise, with `N` derived from the longest value
//! - **varchar(100)** when there are no usable values at all
//!
//! ## Example
//!
//! ```rust
//! use schema_replay_core::inference::{ColumnType, infer};
//!
//! assert_eq!(infer(["1", "2", "3"]), ColumnType::BigInt);
//! assert_eq!(infer(["1.5", "", "2"]), ColumnType::Float);
//! assert_eq!(infer(["MD", "PHYSICIAN"]), ColumnType::Varchar(10));
//! ```

mod config;
mod inferrer;
mod types;

pub use config::{
    DEFAULT_SAMPLE_ROWS, DEFAULT_VARCHAR_LENGTH, InferenceConfig, InferenceConfigBuilder,
    MAX_VARCHAR_LENGTH,
};
pub use inferrer::{ColumnInferrer, ColumnStats, infer, infer_with_config, round_varchar_length};
pub use types::ColumnType;
