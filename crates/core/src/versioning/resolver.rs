//! Grouping of per-period observations into schema versions

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::period::{Period, ValidityEnd};

use super::error::VersionError;
use super::schema::{ColumnSchema, SchemaVersion};

/// Build the schema versions of one table from its observations
///
/// Periods that produced an identical [`ColumnSchema`] are grouped into one
/// version spanning the first to the last of those periods. The version holding
/// the latest observed period is left open-ended. The result is sorted by
/// start, which is also the lookup order.
///
/// When a layout reappears after a different one (A, B, A), the recurring
/// layout gets one version per contiguous run so that windows never overlap.
/// If the same period is observed more than once, the last observation wins.
pub fn resolve<I>(table: &str, observations: I) -> Vec<SchemaVersion>
where
    I: IntoIterator<Item = (Period, ColumnSchema)>,
{
    let mut by_period: BTreeMap<Period, ColumnSchema> = BTreeMap::new();
    for (period, schema) in observations {
        let replaced = by_period.insert(period, schema);
        if let Some(previous) = replaced {
            if by_period.get(&period) != Some(&previous) {
                warn!(
                    table = %table,
                    period = %period,
                    "Conflicting layouts observed for one period, keeping the last"
                );
            }
        }
    }

    let mut versions: Vec<SchemaVersion> = Vec::new();
    for (period, schema) in by_period {
        match versions.last_mut() {
            Some(current) if current.columns == schema => {
                current.end = ValidityEnd::Through(period);
            }
            _ => {
                if versions.iter().any(|v| v.columns == schema) {
                    debug!(
                        table = %table,
                        period = %period,
                        "Layout reverted to an earlier version, starting a new window"
                    );
                }
                versions.push(SchemaVersion {
                    start: period,
                    end: ValidityEnd::Through(period),
                    columns: schema,
                });
            }
        }
    }

    if let Some(latest) = versions.last_mut() {
        latest.end = ValidityEnd::Open;
    }

    for version in &versions {
        debug!(
            table = %table,
            start = %version.start,
            end = %version.end,
            columns = version.columns.len(),
            "Resolved schema version"
        );
    }

    versions
}

/// Find the layout whose window contains `period`
pub fn lookup<'a>(
    table: &str,
    versions: &'a [SchemaVersion],
    period: Period,
) -> Result<&'a ColumnSchema, VersionError> {
    versions
        .iter()
        .find(|version| version.contains(period))
        .map(|version| &version.columns)
        .ok_or_else(|| VersionError::SchemaNotFound {
            table: table.to_string(),
            period,
        })
}
