//! Embedded DuckDB connection

use std::path::{Path, PathBuf};

use tracing::info;

use crate::executor::{DbError, SqlConnection};
use crate::script::quote_qualified;

/// An embedded DuckDB database, on disk or in memory
pub struct DuckDbConnection {
    conn: duckdb::Connection,
    path: Option<PathBuf>,
}

impl DuckDbConnection {
    /// Open or create a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        let conn = duckdb::Connection::open(path).map_err(to_db_error)?;
        info!(path = %path.display(), "Opened DuckDB database");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database
    pub fn memory() -> Result<Self, DbError> {
        let conn = duckdb::Connection::open_in_memory().map_err(to_db_error)?;
        Ok(Self { conn, path: None })
    }

    /// Database file, if not in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn table_exists(&self, schema: Option<&str>, table: &str) -> Result<bool, DbError> {
        let count: i64 = match schema {
            Some(schema) => self.conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE lower(table_name) = lower(?) AND lower(table_schema) = lower(?)",
                [table, schema],
                |row| row.get(0),
            ),
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE lower(table_name) = lower(?)",
                [table],
                |row| row.get(0),
            ),
        }
        .map_err(to_db_error)?;
        Ok(count > 0)
    }
}

impl SqlConnection for DuckDbConnection {
    fn begin(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("BEGIN TRANSACTION").map_err(to_db_error)
    }

    fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.conn.execute_batch(sql).map_err(to_db_error)
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("COMMIT").map_err(to_db_error)
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.conn.execute_batch("ROLLBACK").map_err(to_db_error)
    }

    fn row_count(&mut self, schema: Option<&str>, table: &str) -> Result<Option<i64>, DbError> {
        if !self.table_exists(schema, table)? {
            return Ok(None);
        }
        let sql = format!("SELECT COUNT(*) FROM {}", quote_qualified(schema, table));
        self.conn
            .query_row(&sql, [], |row| row.get::<_, i64>(0))
            .map(Some)
            .map_err(to_db_error)
    }
}

/// DuckDB reports no SQLSTATE; classify by message
fn to_db_error(err: duckdb::Error) -> DbError {
    DbError::from_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ErrorClass;

    #[test]
    fn test_statement_scope_and_row_count() {
        let mut conn = DuckDbConnection::memory().unwrap();
        conn.begin().unwrap();
        conn.execute("CREATE TABLE demo (primaryid BIGINT)").unwrap();
        conn.commit().unwrap();

        conn.begin().unwrap();
        conn.execute("INSERT INTO demo VALUES (1), (2)").unwrap();
        conn.rollback().unwrap();

        assert_eq!(conn.row_count(None, "demo").unwrap(), Some(0));
        assert_eq!(conn.row_count(Some("main"), "DEMO").unwrap(), Some(0));
        assert_eq!(conn.row_count(None, "drug").unwrap(), None);
    }

    #[test]
    fn test_errors_classified() {
        let mut conn = DuckDbConnection::memory().unwrap();
        conn.execute("CREATE TABLE demo (primaryid BIGINT)").unwrap();

        let err = conn.execute("CREATE TABLE demo (primaryid BIGINT)").unwrap_err();
        assert_eq!(err.class, ErrorClass::IdempotentConflict);

        let err = conn.execute("CREAT TABLE drug (x BIGINT)").unwrap_err();
        assert_eq!(err.class, ErrorClass::Fatal);
    }
}
