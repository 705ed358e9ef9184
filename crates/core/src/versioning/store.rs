//! Persisted schema configuration
//!
//! The on-disk contract read by every load stage: a map from table name to an
//! ordered list of `{date_range: [start, end], columns: {name: type}}` entries.
//! Files ending in `.yaml`/`.yml` are YAML; anything else is JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::period::Period;

use super::error::VersionError;
use super::resolver::lookup;
use super::schema::{ColumnSchema, SchemaVersion};

/// Schema versions for every known table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaConfig {
    tables: BTreeMap<String, Vec<SchemaVersion>>,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the versions of a table; names are lower-cased
    pub fn insert(&mut self, table: &str, mut versions: Vec<SchemaVersion>) {
        versions.sort_by_key(|v| v.start);
        self.tables.insert(table.to_lowercase(), versions);
    }

    /// Table names in sorted order
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Versions of one table, in lookup order
    pub fn versions(&self, table: &str) -> &[SchemaVersion] {
        self.tables
            .get(&table.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Resolve the layout of `table` for `period`
    pub fn lookup(&self, table: &str, period: Period) -> Result<&ColumnSchema, VersionError> {
        lookup(table, self.versions(table), period)
    }

    /// Check that each table's windows are sorted and pairwise disjoint
    pub fn validate(&self) -> Result<(), VersionError> {
        for (table, versions) in &self.tables {
            for (i, first) in versions.iter().enumerate() {
                for second in &versions[i + 1..] {
                    if first.overlaps(second) || second.start < first.start {
                        let (a_start, a_end) = first.date_range();
                        let (b_start, b_end) = second.date_range();
                        return Err(VersionError::OverlappingWindows {
                            table: table.clone(),
                            first: format!("[{a_start}, {a_end}]"),
                            second: format!("[{b_start}, {b_end}]"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, VersionError> {
        let config = serde_json::from_str::<SchemaConfig>(json)?.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, VersionError> {
        let config = serde_yaml::from_str::<SchemaConfig>(yaml)?.normalized();
        config.validate()?;
        Ok(config)
    }

    /// Lower-case table names as `insert` does, merging names that differ
    /// only in case
    fn normalized(self) -> Self {
        let mut tables: BTreeMap<String, Vec<SchemaVersion>> = BTreeMap::new();
        for (table, versions) in self.tables {
            tables.entry(table.to_lowercase()).or_default().extend(versions);
        }
        for versions in tables.values_mut() {
            versions.sort_by_key(|v| v.start);
        }
        Self { tables }
    }

    /// Render as pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, VersionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as YAML
    pub fn to_yaml_string(&self) -> Result<String, VersionError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load a schema configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VersionError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| VersionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = if is_yaml(path) {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        info!(
            path = %path.display(),
            tables = config.tables.len(),
            "Loaded schema configuration"
        );
        Ok(config)
    }

    /// Write the configuration, overwriting any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), VersionError> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            self.to_yaml_string()?
        } else {
            self.to_json_string()?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| VersionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| VersionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            tables = self.tables.len(),
            "Saved schema configuration"
        );
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
