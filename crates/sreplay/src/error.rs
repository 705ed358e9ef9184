//! CLI error type

use std::path::PathBuf;

use schema_replay_core::config::ConfigError;
use schema_replay_core::discovery::DiscoveryError;
use schema_replay_core::executor::{DbError, ExecutionHalted};
use schema_replay_core::period::PeriodError;
use schema_replay_core::versioning::VersionError;
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// A statement failed fatally
    #[error(transparent)]
    Halted(#[from] Box<ExecutionHalted>),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output error: {0}")]
    Output(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly message with a hint
    pub fn user_message(&self) -> String {
        match self {
            CliError::Config(e) => e.user_message(),
            CliError::Discovery(e) => e.user_message(),
            CliError::Version(e) => e.user_message(),
            CliError::Halted(e) => e.user_message(),
            CliError::Database(e) => {
                let mut message = format!("Database error: {}", e.message);
                if let Some(code) = &e.code {
                    message.push_str(&format!(" (SQLSTATE {code})"));
                }
                message.push_str("\n\nHint: Check the [database] settings and that the server is reachable.");
                message
            }
            CliError::Io { path, source } => format!(
                "Cannot access {}: {source}\n\nHint: Check the path and its permissions.",
                path.display()
            ),
            _ => self.to_string(),
        }
    }
}
