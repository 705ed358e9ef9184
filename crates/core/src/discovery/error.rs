//! Error types for extract discovery

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning quarterly extracts
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Source directory missing or unreadable
    #[error("Cannot access source directory {path}: {source}")]
    SourceNotAccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    /// A file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file has no header line
    #[error("File has no header: {0}")]
    MissingHeader(PathBuf),
}

impl DiscoveryError {
    /// Get a user-friendly message with a hint
    pub fn user_message(&self) -> String {
        match self {
            DiscoveryError::SourceNotAccessible { path, .. } => format!(
                "Cannot access source directory: {}\n\n\
                Hint: Point --source at the directory holding the unpacked quarterly files.",
                path.display()
            ),
            DiscoveryError::InvalidPattern(pattern) => format!(
                "Invalid glob pattern: {pattern}\n\n\
                Hint: Use standard glob syntax like '*.txt' or '**/*.txt'."
            ),
            DiscoveryError::MissingHeader(path) => format!(
                "File has no header line: {}\n\n\
                Hint: Quarterly extracts start with a delimited header row.",
                path.display()
            ),
            _ => self.to_string(),
        }
    }
}
