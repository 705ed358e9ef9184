//! Quarterly release periods and validity-window bounds
//!
//! A [`Period`] identifies one quarterly data release. Its textual label is
//! `"<year>Q<quarter>"` (for example `2012Q4`), which is also the form used in
//! the persisted schema configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Label persisted for an open-ended validity window
pub const OPEN_ENDED_LABEL: &str = "9999Q4";

/// Errors produced when building or parsing a period
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// Quarter outside 1..=4
    #[error("Invalid quarter {0}: expected 1-4")]
    InvalidQuarter(u8),

    /// Label not of the form `<year>Q<quarter>`
    #[error("Invalid period label '{0}': expected <year>Q<quarter>, e.g. 2012Q4")]
    InvalidLabel(String),
}

/// One quarterly data release
///
/// Ordering is chronological and matches ordering by `year * 10 + quarter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    quarter: u8,
}

impl Period {
    /// Create a period, rejecting quarters outside 1..=4
    pub fn new(year: i32, quarter: u8) -> Result<Self, PeriodError> {
        if !(1..=4).contains(&quarter) {
            return Err(PeriodError::InvalidQuarter(quarter));
        }
        Ok(Self { year, quarter })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// Sortable integer key, `year * 10 + quarter`
    pub fn ordinal(&self) -> i64 {
        i64::from(self.year) * 10 + i64::from(self.quarter)
    }

    /// The quarter immediately after this one, `None` past the last
    /// representable year
    pub fn next(&self) -> Option<Self> {
        if self.quarter == 4 {
            Some(Self {
                year: self.year.checked_add(1)?,
                quarter: 1,
            })
        } else {
            Some(Self {
                year: self.year,
                quarter: self.quarter + 1,
            })
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, quarter) = trimmed
            .split_once(['Q', 'q'])
            .ok_or_else(|| PeriodError::InvalidLabel(s.to_string()))?;

        let year: i32 = year
            .parse()
            .map_err(|_| PeriodError::InvalidLabel(s.to_string()))?;
        let quarter: u8 = quarter
            .parse()
            .map_err(|_| PeriodError::InvalidLabel(s.to_string()))?;

        Period::new(year, quarter)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Upper bound of a validity window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidityEnd {
    /// Window ends at (and includes) this period
    Through(Period),
    /// Window is still current; persisted as [`OPEN_ENDED_LABEL`]
    Open,
}

impl ValidityEnd {
    /// Whether `period` is at or before this bound
    pub fn admits(&self, period: Period) -> bool {
        match self {
            ValidityEnd::Through(end) => period <= *end,
            ValidityEnd::Open => true,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ValidityEnd::Open)
    }
}

impl fmt::Display for ValidityEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityEnd::Through(period) => period.fmt(f),
            ValidityEnd::Open => f.write_str(OPEN_ENDED_LABEL),
        }
    }
}

impl FromStr for ValidityEnd {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let period: Period = s.parse()?;
        if period.to_string() == OPEN_ENDED_LABEL {
            Ok(ValidityEnd::Open)
        } else {
            Ok(ValidityEnd::Through(period))
        }
    }
}

impl Serialize for ValidityEnd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ValidityEnd {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_label_round_trip() {
        let period: Period = "2012Q4".parse().unwrap();
        assert_eq!(period.year(), 2012);
        assert_eq!(period.quarter(), 4);
        assert_eq!(period.to_string(), "2012Q4");

        let lower: Period = "2019q1".parse().unwrap();
        assert_eq!(lower.to_string(), "2019Q1");
    }

    #[test]
    fn test_invalid_labels() {
        assert_eq!(
            "2012Q5".parse::<Period>(),
            Err(PeriodError::InvalidQuarter(5))
        );
        assert!(matches!(
            "2012".parse::<Period>(),
            Err(PeriodError::InvalidLabel(_))
        ));
        assert!(matches!(
            "Q3".parse::<Period>(),
            Err(PeriodError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_ordering_matches_ordinal() {
        let a = Period::new(2012, 4).unwrap();
        let b = Period::new(2013, 1).unwrap();
        assert!(a < b);
        assert!(a.ordinal() < b.ordinal());
        assert_eq!(a.next(), Some(b));
        assert_eq!(b.next(), Period::new(2013, 2).ok());
    }

    #[test]
    fn test_next_stops_at_last_year() {
        let last = Period::new(i32::MAX, 4).unwrap();
        assert_eq!(last.next(), None);
        assert_eq!(Period::new(i32::MAX, 3).unwrap().next(), Some(last));
    }

    #[test]
    fn test_open_ended_label() {
        let end: ValidityEnd = OPEN_ENDED_LABEL.parse().unwrap();
        assert!(end.is_open());
        assert_eq!(end.to_string(), "9999Q4");

        let end: ValidityEnd = "2015Q2".parse().unwrap();
        assert_eq!(end, ValidityEnd::Through(Period::new(2015, 2).unwrap()));
        assert!(end.admits(Period::new(2015, 2).unwrap()));
        assert!(!end.admits(Period::new(2015, 3).unwrap()));
        assert!(ValidityEnd::Open.admits(Period::new(3000, 1).unwrap()));
    }

    #[test]
    fn test_serde_as_label() {
        let period = Period::new(2004, 1).unwrap();
        let json = serde_json::to_string(&period).unwrap();
        assert_eq!(json, "\"2004Q1\"");
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }
}
