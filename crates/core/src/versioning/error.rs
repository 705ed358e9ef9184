//! Error types for schema versioning

use std::path::PathBuf;

use thiserror::Error;

use crate::period::Period;

/// Errors that can occur while resolving or persisting schema versions
#[derive(Error, Debug)]
pub enum VersionError {
    /// No version window covers the requested period
    #[error("No schema version for table '{table}' covers {period}")]
    SchemaNotFound { table: String, period: Period },

    /// A persisted window ends before it starts
    #[error("Invalid validity window: {end} is before {start}")]
    InvalidWindow { start: String, end: String },

    /// Persisted windows for one table overlap
    #[error("Overlapping validity windows for table '{table}': {first} and {second}")]
    OverlappingWindows {
        table: String,
        first: String,
        second: String,
    },

    /// IO error with path context
    #[error("IO error with {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or rendering error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl VersionError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            VersionError::SchemaNotFound { table, period } => {
                format!(
                    "No schema version for table '{table}' covers {period}.\n\n\
                    Hint: Re-run 'sreplay discover' after adding the extract for {period}."
                )
            }
            VersionError::OverlappingWindows { table, .. } => {
                format!(
                    "{self}\n\nHint: The schema configuration for '{table}' was edited by hand; \
                    regenerate it with 'sreplay discover'."
                )
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VersionError::SchemaNotFound {
            table: "demo".to_string(),
            period: Period::new(2003, 2).unwrap(),
        };
        assert!(err.to_string().contains("demo"));
        assert!(err.to_string().contains("2003Q2"));
        assert!(err.user_message().contains("Hint:"));
    }
}
