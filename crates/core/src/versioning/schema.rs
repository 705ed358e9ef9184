//! Column layouts and their validity windows

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::inference::ColumnType;
use crate::period::{Period, ValidityEnd};
use crate::script::quote_ident;

use super::error::VersionError;

/// Ordered mapping from lower-cased column name to inferred type
///
/// Column order follows the source file header. Equality and hashing ignore
/// order: two files with the same columns and types in a different order
/// share one schema.
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    columns: Vec<(String, ColumnType)>,
}

impl ColumnSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate columns in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Column names in source order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Type of a column, matched case-insensitively
    pub fn get(&self, name: &str) -> Option<ColumnType> {
        let name = name.to_lowercase();
        self.columns
            .iter()
            .find(|(column, _)| *column == name)
            .map(|(_, ty)| *ty)
    }

    /// Order-independent view used for equality and hashing
    fn canonical(&self) -> BTreeMap<&str, ColumnType> {
        self.iter().collect()
    }

    /// Render a `CREATE TABLE IF NOT EXISTS` statement for this layout
    pub fn create_table_sql(&self, table: &str) -> String {
        let columns = self
            .iter()
            .map(|(name, ty)| format!("    {} {}", quote_ident(name), ty))
            .collect::<Vec<_>>()
            .join(",\n");
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            quote_ident(table),
            columns
        )
    }

    fn insert(&mut self, name: &str, ty: ColumnType) {
        let name = name.trim().to_lowercase();
        match self.columns.iter_mut().find(|(column, _)| *column == name) {
            Some(existing) => existing.1 = ty,
            None => self.columns.push((name, ty)),
        }
    }
}

impl<S: AsRef<str>> FromIterator<(S, ColumnType)> for ColumnSchema {
    /// Build a schema; names are lower-cased and a repeated name keeps its
    /// first position with the last type
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        let mut schema = ColumnSchema::new();
        for (name, ty) in iter {
            schema.insert(name.as_ref(), ty);
        }
        schema
    }
}

impl PartialEq for ColumnSchema {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.canonical() == other.canonical()
    }
}

impl Eq for ColumnSchema {}

impl Hash for ColumnSchema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (name, ty) in self.canonical() {
            name.hash(state);
            ty.hash(state);
        }
    }
}

impl Serialize for ColumnSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, ty) in self.iter() {
            map.serialize_entry(name, &ty)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColumnSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnsVisitor;

        impl<'de> Visitor<'de> for ColumnsVisitor {
            type Value = ColumnSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column name to column type")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut schema = ColumnSchema::new();
                while let Some((name, ty)) = access.next_entry::<String, ColumnType>()? {
                    schema.insert(&name, ty);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(ColumnsVisitor)
    }
}

/// One inferred layout and the periods it is valid for
///
/// The window is the convex span from the first to the last period that
/// produced this layout. Periods inside the span that were never observed are
/// assumed to share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedVersion", into = "PersistedVersion")]
pub struct SchemaVersion {
    pub start: Period,
    pub end: ValidityEnd,
    pub columns: ColumnSchema,
}

impl SchemaVersion {
    /// Whether this version's window contains `period`
    pub fn contains(&self, period: Period) -> bool {
        self.start <= period && self.end.admits(period)
    }

    /// Whether the windows of two versions share any period
    pub fn overlaps(&self, other: &SchemaVersion) -> bool {
        let self_before_other = match self.end {
            ValidityEnd::Through(end) => end < other.start,
            ValidityEnd::Open => false,
        };
        let other_before_self = match other.end {
            ValidityEnd::Through(end) => end < self.start,
            ValidityEnd::Open => false,
        };
        !self_before_other && !other_before_self
    }

    /// `[start, end]` labels as persisted
    pub fn date_range(&self) -> (String, String) {
        (self.start.to_string(), self.end.to_string())
    }
}

/// On-disk form: `{date_range: [start, end], columns: {name: type}}`
#[derive(Serialize, Deserialize)]
struct PersistedVersion {
    date_range: (Period, ValidityEnd),
    columns: ColumnSchema,
}

impl TryFrom<PersistedVersion> for SchemaVersion {
    type Error = VersionError;

    fn try_from(value: PersistedVersion) -> Result<Self, Self::Error> {
        let (start, end) = value.date_range;
        if let ValidityEnd::Through(end) = end {
            if end < start {
                return Err(VersionError::InvalidWindow {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(SchemaVersion {
            start,
            end,
            columns: value.columns,
        })
    }
}

impl From<SchemaVersion> for PersistedVersion {
    fn from(value: SchemaVersion) -> Self {
        PersistedVersion {
            date_range: (value.start, value.end),
            columns: value.columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn period(label: &str) -> Period {
        label.parse().unwrap()
    }

    fn hash_of(schema: &ColumnSchema) -> u64 {
        let mut hasher = DefaultHasher::new();
        schema.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_names_are_lower_cased() {
        let schema: ColumnSchema = [("PrimaryID", ColumnType::BigInt)].into_iter().collect();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["primaryid"]);
        assert_eq!(schema.get("PRIMARYID"), Some(ColumnType::BigInt));
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: ColumnSchema = [("a", ColumnType::BigInt), ("b", ColumnType::Float)]
            .into_iter()
            .collect();
        let b: ColumnSchema = [("b", ColumnType::Float), ("a", ColumnType::BigInt)]
            .into_iter()
            .collect();
        let c: ColumnSchema = [("a", ColumnType::BigInt), ("b", ColumnType::Varchar(10))]
            .into_iter()
            .collect();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn test_serialization_keeps_column_order() {
        let schema: ColumnSchema = [("zeta", ColumnType::BigInt), ("alpha", ColumnType::Float)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&schema).unwrap();
        assert_eq!(json, r#"{"zeta":"bigint","alpha":"float(24)"}"#);

        let back: ColumnSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_create_table_sql() {
        let schema: ColumnSchema = [("primaryid", ColumnType::BigInt), ("sex", ColumnType::Varchar(10))]
            .into_iter()
            .collect();
        assert_eq!(
            schema.create_table_sql("demo"),
            "CREATE TABLE IF NOT EXISTS \"demo\" (\n    \"primaryid\" bigint,\n    \"sex\" varchar(10)\n)"
        );
    }

    #[test]
    fn test_version_window() {
        let version = SchemaVersion {
            start: period("2012Q4"),
            end: ValidityEnd::Through(period("2014Q2")),
            columns: ColumnSchema::new(),
        };
        assert!(version.contains(period("2012Q4")));
        assert!(version.contains(period("2013Q3")));
        assert!(version.contains(period("2014Q2")));
        assert!(!version.contains(period("2012Q3")));
        assert!(!version.contains(period("2014Q3")));
    }

    #[test]
    fn test_overlaps() {
        let closed = SchemaVersion {
            start: period("2012Q1"),
            end: ValidityEnd::Through(period("2012Q4")),
            columns: ColumnSchema::new(),
        };
        let open = SchemaVersion {
            start: period("2013Q1"),
            end: ValidityEnd::Open,
            columns: ColumnSchema::new(),
        };
        let straddling = SchemaVersion {
            start: period("2012Q3"),
            end: ValidityEnd::Through(period("2013Q2")),
            columns: ColumnSchema::new(),
        };
        assert!(!closed.overlaps(&open));
        assert!(straddling.overlaps(&closed));
        assert!(straddling.overlaps(&open));
    }

    #[test]
    fn test_persisted_form() {
        let version = SchemaVersion {
            start: period("2012Q4"),
            end: ValidityEnd::Open,
            columns: [("caseid", ColumnType::BigInt)].into_iter().collect(),
        };
        let json = serde_json::to_value(&version).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date_range": ["2012Q4", "9999Q4"],
                "columns": {"caseid": "bigint"}
            })
        );

        let back: SchemaVersion = serde_json::from_value(json).unwrap();
        assert_eq!(back, version);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let json = serde_json::json!({
            "date_range": ["2014Q1", "2012Q1"],
            "columns": {}
        });
        assert!(serde_json::from_value::<SchemaVersion>(json).is_err());
    }
}
