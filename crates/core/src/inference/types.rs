//! Column type tags produced by inference

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Inferred SQL column type
///
/// The textual tags (`bigint`, `float(24)`, `varchar(N)`) are part of the
/// persisted schema configuration and are read by every load stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    /// 64-bit integer
    BigInt,
    /// Single-precision float, rendered `float(24)`
    Float,
    /// Variable-length string with a maximum length
    Varchar(u32),
}

impl ColumnType {
    /// Whether values of this type are stored as text
    pub fn is_text(&self) -> bool {
        matches!(self, ColumnType::Varchar(_))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::BigInt => f.write_str("bigint"),
            ColumnType::Float => f.write_str("float(24)"),
            ColumnType::Varchar(len) => write!(f, "varchar({len})"),
        }
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        match tag.as_str() {
            "bigint" => Ok(ColumnType::BigInt),
            "float(24)" => Ok(ColumnType::Float),
            _ => tag
                .strip_prefix("varchar(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|len| len.trim().parse::<u32>().ok())
                .filter(|len| *len > 0)
                .map(ColumnType::Varchar)
                .ok_or_else(|| {
                    format!(
                        "Invalid column type: {s}. Expected: bigint, float(24), varchar(<length>)"
                    )
                }),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(ColumnType::BigInt.to_string(), "bigint");
        assert_eq!(ColumnType::Float.to_string(), "float(24)");
        assert_eq!(ColumnType::Varchar(300).to_string(), "varchar(300)");
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!("BIGINT".parse::<ColumnType>(), Ok(ColumnType::BigInt));
        assert_eq!("float(24)".parse::<ColumnType>(), Ok(ColumnType::Float));
        assert_eq!(
            "varchar(50)".parse::<ColumnType>(),
            Ok(ColumnType::Varchar(50))
        );
        assert!("varchar(0)".parse::<ColumnType>().is_err());
        assert!("text".parse::<ColumnType>().is_err());
    }
}
