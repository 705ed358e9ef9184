//! Replay configuration loaded from TOML
//!
//! ```toml
//! [database]
//! backend = "postgres"
//! host = "localhost"
//! port = 5432
//! user = "faers"
//! database = "faers"
//! schema = "public"
//!
//! [retry]
//! max_attempts = 3
//! delay_secs = 5
//!
//! [verify]
//! tables = ["demo", "drug"]
//! ```
//!
//! The password may be omitted from the file and supplied through
//! `SREPLAY_DB_PASSWORD` instead. The duckdb backend needs `path`; use
//! `path = ":memory:"` for a throwaway database.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::executor::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};

/// Environment variable consulted for the database password
pub const PASSWORD_ENV: &str = "SREPLAY_DB_PASSWORD";

const DEFAULT_PORT: u16 = 5432;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Get a user-friendly message with a hint
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Io { path, .. } => format!(
                "Cannot read configuration file '{}'.\nHint: Pass the path with --config.",
                path.display()
            ),
            ConfigError::Parse(err) => format!(
                "The configuration file is not valid TOML: {err}\nHint: Check quoting and section names ([database], [retry], [verify])."
            ),
            ConfigError::Missing("database.password") => format!(
                "No database password configured.\nHint: Set database.password or export {PASSWORD_ENV}."
            ),
            ConfigError::Missing(field) => format!(
                "Missing required setting '{field}'.\nHint: Add it to the configuration file."
            ),
            ConfigError::Invalid { field, reason } => {
                format!("Setting '{field}' is invalid: {reason}")
            }
        }
    }
}

/// Database engine to replay against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgres,
    DuckDb,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Postgres => f.write_str("postgres"),
            Backend::DuckDb => f.write_str("duckdb"),
        }
    }
}

/// Connection settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Schema used to qualify verification queries
    pub schema: Option<String>,
    /// Database file for the embedded backend; in-memory when absent
    pub path: Option<PathBuf>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("path", &self.path)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            host: String::new(),
            port: DEFAULT_PORT,
            user: String::new(),
            password: None,
            database: String::new(),
            schema: None,
            path: None,
        }
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            Backend::Postgres => {
                if self.host.trim().is_empty() {
                    return Err(ConfigError::Missing("database.host"));
                }
                if self.user.trim().is_empty() {
                    return Err(ConfigError::Missing("database.user"));
                }
                if self.database.trim().is_empty() {
                    return Err(ConfigError::Missing("database.database"));
                }
                if self.password.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::Missing("database.password"));
                }
                if self.port == 0 {
                    return Err(ConfigError::Invalid {
                        field: "database.port",
                        reason: "port 0 is not connectable".to_string(),
                    });
                }
            }
            Backend::DuckDb => {
                let Some(path) = &self.path else {
                    return Err(ConfigError::Missing("database.path"));
                };
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::Invalid {
                        field: "database.path",
                        reason: "path is empty".to_string(),
                    });
                }
            }
        }
        if self.schema.as_ref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "database.schema",
                reason: "schema name is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Retry settings for transient errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_secs: DEFAULT_RETRY_DELAY.as_secs(),
        }
    }
}

/// Tables expected to hold rows after the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub tables: Vec<String>,
}

/// Complete replay configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub database: DatabaseConfig,
    pub retry: RetryConfig,
    pub verify: VerifyConfig,
}

impl ReplayConfig {
    /// Load, apply the password environment variable, and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text)?;
        config.apply_password(std::env::var(PASSWORD_ENV).ok());
        config.validate()?;
        debug!(path = %path.display(), backend = %config.database.backend, "Loaded replay config");
        Ok(config)
    }

    /// Parse and validate without consulting the environment
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(text)?;
        config.validate()?;
        Ok(config)
    }

    fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Use `password` when the file did not set one
    pub fn apply_password(&mut self, password: Option<String>) {
        if self.database.password.as_deref().is_none_or(str::is_empty) {
            self.database.password = password.filter(|p| !p.is_empty());
        }
    }

    /// Check required settings before any database work
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(table) = self.verify.tables.iter().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "verify.tables",
                reason: format!("empty table name {table:?}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSTGRES: &str = r#"
[database]
host = "localhost"
user = "faers"
password = "secret"
database = "faers"
schema = "public"

[retry]
max_attempts = 5
delay_secs = 1

[verify]
tables = ["demo", "drug"]
"#;

    #[test]
    fn test_parse_postgres() {
        let config = ReplayConfig::from_toml_str(POSTGRES).unwrap();
        assert_eq!(config.database.backend, Backend::Postgres);
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.verify.tables, vec!["demo", "drug"]);
    }

    #[test]
    fn test_defaults() {
        let config =
            ReplayConfig::from_toml_str("[database]\nbackend = \"duckdb\"\npath = \":memory:\"\n")
                .unwrap();
        assert_eq!(config.database.backend, Backend::DuckDb);
        assert_eq!(config.retry, RetryConfig::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_secs, 5);
        assert!(config.verify.tables.is_empty());
    }

    #[test]
    fn test_missing_password_fails_fast() {
        let text = POSTGRES.replace("password = \"secret\"\n", "");
        let err = ReplayConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("database.password")));
        assert!(err.user_message().contains(PASSWORD_ENV));
    }

    #[test]
    fn test_password_from_environment_value() {
        let text = POSTGRES.replace("password = \"secret\"\n", "");
        let mut config = ReplayConfig::parse(&text).unwrap();
        config.apply_password(Some("from-env".to_string()));
        config.validate().unwrap();
        assert_eq!(config.database.password.as_deref(), Some("from-env"));

        // The file wins over the environment
        let mut config = ReplayConfig::parse(POSTGRES).unwrap();
        config.apply_password(Some("from-env".to_string()));
        assert_eq!(config.database.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_duckdb_requires_path() {
        let err = ReplayConfig::from_toml_str("[database]\nbackend = \"duckdb\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("database.path")));

        assert!(matches!(
            ReplayConfig::from_toml_str("[database]\nbackend = \"duckdb\"\npath = \"\"\n"),
            Err(ConfigError::Invalid {
                field: "database.path",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_host() {
        let text = POSTGRES.replace("host = \"localhost\"\n", "");
        assert!(matches!(
            ReplayConfig::from_toml_str(&text),
            Err(ConfigError::Missing("database.host"))
        ));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let text = POSTGRES.replace("max_attempts = 5", "max_attempts = 0");
        assert!(matches!(
            ReplayConfig::from_toml_str(&text),
            Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_port_rejected() {
        let text = POSTGRES.replace("host = \"localhost\"", "host = \"localhost\"\nport = 0");
        assert!(matches!(
            ReplayConfig::from_toml_str(&text),
            Err(ConfigError::Invalid {
                field: "database.port",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ReplayConfig::from_toml_str("[database\nhost = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let config = ReplayConfig::from_toml_str(POSTGRES).unwrap();
        let debug = format!("{:?}", config.database);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.toml");
        std::fs::write(&path, POSTGRES).unwrap();
        let config = ReplayConfig::load(&path).unwrap();
        assert_eq!(config.database.user, "faers");

        let err = ReplayConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
