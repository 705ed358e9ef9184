//! PostgreSQL connection driven synchronously

use tokio::runtime::{Builder, Runtime};
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::executor::{DbError, ErrorClass, SqlConnection};
use crate::script::quote_qualified;

/// A blocking PostgreSQL connection
///
/// The async client runs on a private current-thread runtime; every call
/// blocks until its round-trip completes, so statements stay strictly
/// sequential on one connection.
pub struct PostgresConnection {
    runtime: Runtime,
    client: Client,
}

impl PostgresConnection {
    /// Connect using the `[database]` settings
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DbError::fatal(format!("Failed to start async runtime: {e}")))?;

        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port)
            .user(&config.user)
            .dbname(&config.database)
            .application_name("sreplay");
        if let Some(password) = &config.password {
            pg.password(password);
        }

        let (client, connection) = runtime.block_on(pg.connect(NoTls)).map_err(to_db_error)?;

        runtime.spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection closed with error");
            }
        });

        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Connected to PostgreSQL"
        );
        Ok(Self { runtime, client })
    }

    fn batch(&mut self, sql: &str) -> Result<(), DbError> {
        self.runtime
            .block_on(self.client.batch_execute(sql))
            .map_err(to_db_error)
    }
}

impl SqlConnection for PostgresConnection {
    fn begin(&mut self) -> Result<(), DbError> {
        self.batch("BEGIN")
    }

    fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        self.batch(sql)
    }

    fn commit(&mut self) -> Result<(), DbError> {
        self.batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), DbError> {
        self.batch("ROLLBACK")
    }

    fn row_count(&mut self, schema: Option<&str>, table: &str) -> Result<Option<i64>, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_qualified(schema, table));
        match self.runtime.block_on(self.client.query_one(sql.as_str(), &[])) {
            Ok(row) => row
                .try_get::<_, i64>(0)
                .map(Some)
                .map_err(|e| DbError::fatal(format!("Unexpected row count value: {e}"))),
            Err(err) if is_missing_relation(&err) => {
                debug!(table, "Relation not found");
                Ok(None)
            }
            Err(err) => Err(to_db_error(err)),
        }
    }
}

fn is_missing_relation(err: &tokio_postgres::Error) -> bool {
    err.code()
        .is_some_and(|code| *code == SqlState::UNDEFINED_TABLE || *code == SqlState::INVALID_SCHEMA_NAME)
}

/// Classify a driver error
///
/// Server errors carry a SQLSTATE. A closed client means the connection
/// was shut down under us and is treated as fatal; other errors without
/// a code are connection-level and treated as transient.
fn to_db_error(err: tokio_postgres::Error) -> DbError {
    if let Some(db) = err.as_db_error() {
        return DbError::from_sqlstate(db.code().code(), db.message());
    }
    if err.is_closed() {
        return DbError::new(ErrorClass::Fatal, format!("connection closed: {err}"));
    }
    DbError::new(ErrorClass::Transient, err.to_string())
}
