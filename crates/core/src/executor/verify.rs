//! Post-run row-count checks for expected tables

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::connection::SqlConnection;

/// What the row count check found for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum TableStatus {
    Populated(i64),
    Empty,
    Missing,
    /// The row count query itself failed
    Inaccessible(String),
}

impl TableStatus {
    pub fn is_populated(&self) -> bool {
        matches!(self, TableStatus::Populated(_))
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Populated(rows) => write!(f, "{rows} row(s)"),
            TableStatus::Empty => f.write_str("empty"),
            TableStatus::Missing => f.write_str("missing"),
            TableStatus::Inaccessible(reason) => write!(f, "inaccessible: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCheck {
    pub table: String,
    #[serde(flatten)]
    pub status: TableStatus,
}

/// Count rows of each expected table
///
/// Empty, missing, and unreadable tables are logged as warnings. This never
/// fails; callers decide what a warning means for them.
pub fn verify_tables<C, S>(conn: &mut C, schema: Option<&str>, tables: &[S]) -> Vec<TableCheck>
where
    C: SqlConnection + ?Sized,
    S: AsRef<str>,
{
    tables
        .iter()
        .map(|table| {
            let table = table.as_ref();
            let status = match conn.row_count(schema, table) {
                Ok(Some(0)) => {
                    warn!(table, "Table has no rows");
                    TableStatus::Empty
                }
                Ok(Some(rows)) => {
                    info!(table, rows, "Table verified");
                    TableStatus::Populated(rows)
                }
                Ok(None) => {
                    warn!(table, "Table does not exist");
                    TableStatus::Missing
                }
                Err(err) => {
                    warn!(table, error = %err, "Could not count table rows");
                    TableStatus::Inaccessible(err.message)
                }
            };
            TableCheck {
                table: table.to_string(),
                status,
            }
        })
        .collect()
}
