//! Integration tests replaying generated DDL against embedded DuckDB

#![cfg(feature = "duckdb-backend")]

use std::time::Duration;

use schema_replay_core::config::{Backend, DatabaseConfig};
use schema_replay_core::database::{self, DuckDbConnection, MEMORY_PATH};
use schema_replay_core::executor::{
    ErrorClass, OutcomeStatus, ResilientExecutor, RetryPolicy, SqlConnection, TableStatus,
    verify_tables,
};
use schema_replay_core::inference::ColumnType;
use schema_replay_core::script::split;
use schema_replay_core::versioning::ColumnSchema;

fn policy() -> RetryPolicy {
    RetryPolicy::new(2, Duration::ZERO)
}

#[test]
fn test_generated_ddl_replays() {
    let schema: ColumnSchema = [
        ("primaryid", ColumnType::BigInt),
        ("caseid", ColumnType::BigInt),
        ("sex", ColumnType::Varchar(10)),
    ]
    .into_iter()
    .collect();
    let script = format!(
        "{};\nINSERT INTO demo_2012q4 VALUES (1, 7, 'F');\n",
        schema.create_table_sql("demo_2012q4")
    );

    let mut conn = DuckDbConnection::memory().unwrap();
    let report = ResilientExecutor::new(&mut conn, policy())
        .run(split(&script).statements)
        .unwrap();
    assert_eq!(report.count(OutcomeStatus::Committed), 2);

    let checks = verify_tables(&mut conn, None, &["demo_2012q4", "drug_2012q4"]);
    assert_eq!(checks[0].status, TableStatus::Populated(1));
    assert_eq!(checks[1].status, TableStatus::Missing);
}

#[test]
fn test_existing_table_is_skipped() {
    let script = "CREATE TABLE drug (primaryid BIGINT);\nCREATE TABLE drug (primaryid BIGINT);\nSELECT 1;";
    let mut conn = DuckDbConnection::memory().unwrap();
    let report = ResilientExecutor::new(&mut conn, policy())
        .run(split(script).statements)
        .unwrap();

    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            OutcomeStatus::Committed,
            OutcomeStatus::SkippedIdempotent,
            OutcomeStatus::Committed,
        ]
    );
}

#[test]
fn test_syntax_error_halts_and_rolls_back_scope() {
    let script = "CREATE TABLE reac (pt VARCHAR(100));\nINSERT INTO reac VALUES ('x');\nINSERT INTO reac VALUSE ('y');\nINSERT INTO reac VALUES ('z');";
    let mut conn = DuckDbConnection::memory().unwrap();
    let halted = ResilientExecutor::new(&mut conn, policy())
        .run(split(script).statements)
        .unwrap_err();
    assert_eq!(halted.index, 2);

    let checks = verify_tables(&mut conn, None, &["reac"]);
    assert_eq!(checks[0].status, TableStatus::Populated(1));
}

#[test]
fn test_procedural_block_reaches_engine_whole() {
    // DuckDB has no DO blocks; the engine must see the whole block and reject it once
    let script = "CREATE TABLE outc (code VARCHAR(10));\nDO $$\nBEGIN\n  INSERT INTO outc VALUES ('DE');\nEND\n$$;";
    let mut conn = DuckDbConnection::memory().unwrap();
    let halted = ResilientExecutor::new(&mut conn, policy())
        .run(split(script).statements)
        .unwrap_err();
    assert_eq!(halted.index, 1);
    assert_eq!(halted.report.outcomes[1].attempts, 1);
}

#[test]
fn test_connect_needs_explicit_path() {
    let mut config = DatabaseConfig {
        backend: Backend::DuckDb,
        ..DatabaseConfig::default()
    };
    let err = database::connect(&config).err().unwrap();
    assert_eq!(err.class, ErrorClass::Fatal);

    config.path = Some(MEMORY_PATH.into());
    let mut conn = database::connect(&config).unwrap();
    conn.execute("CREATE TABLE demo (primaryid BIGINT)").unwrap();
    assert_eq!(conn.row_count(None, "demo").unwrap(), Some(0));
}
