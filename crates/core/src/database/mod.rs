//! Database backends implementing [`SqlConnection`]
//!
//! - `postgres-backend`: PostgreSQL through `tokio-postgres`
//! - `duckdb-backend`: embedded DuckDB

#[cfg(feature = "duckdb-backend")]
mod duckdb;
#[cfg(feature = "postgres-backend")]
mod postgres;

#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::DuckDbConnection;
#[cfg(feature = "postgres-backend")]
pub use self::postgres::PostgresConnection;

use crate::config::{Backend, DatabaseConfig};
use crate::executor::{DbError, SqlConnection};

/// `path` value that selects an in-memory DuckDB database
pub const MEMORY_PATH: &str = ":memory:";

/// Open a connection for the configured backend
pub fn connect(config: &DatabaseConfig) -> Result<Box<dyn SqlConnection>, DbError> {
    match config.backend {
        #[cfg(feature = "postgres-backend")]
        Backend::Postgres => Ok(Box::new(PostgresConnection::connect(config)?)),
        #[cfg(feature = "duckdb-backend")]
        Backend::DuckDb => match config.path.as_deref() {
            Some(path) if path.as_os_str() == MEMORY_PATH => {
                Ok(Box::new(DuckDbConnection::memory()?))
            }
            Some(path) => Ok(Box::new(DuckDbConnection::open(path)?)),
            None => Err(DbError::fatal("database.path is required for the duckdb backend")),
        },
        #[allow(unreachable_patterns)]
        backend => Err(DbError::fatal(format!(
            "Backend '{backend}' is not compiled in; rebuild with the {backend}-backend feature"
        ))),
    }
}
