//! Table and period from quarterly extract file names

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::period::Period;

/// `DEMO12Q4.txt`, `drug_2013q1.csv`, `REAC2014Q2.TXT`
static EXTRACT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<table>[a-z]+?)_?(?P<year>\d{4}|\d{2})q(?P<quarter>[1-4])\.(?:txt|csv)$")
        .unwrap()
});

/// A file recognised as one table's extract for one period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractFile {
    pub path: PathBuf,
    /// Lower-cased table name
    pub table: String,
    pub period: Period,
}

impl ExtractFile {
    /// Recognise `path` by its file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (table, period) = parse_extract_name(name)?;
        Some(Self {
            path: path.to_path_buf(),
            table,
            period,
        })
    }
}

/// Parse `<table><yy|yyyy>q<n>.<txt|csv>`
///
/// Two-digit years are taken as 20YY.
pub fn parse_extract_name(file_name: &str) -> Option<(String, Period)> {
    let caps = EXTRACT_NAME.captures(file_name)?;
    let year_digits = &caps["year"];
    let mut year: i32 = year_digits.parse().ok()?;
    if year_digits.len() == 2 {
        year += 2000;
    }
    let quarter: u8 = caps["quarter"].parse().ok()?;
    let period = Period::new(year, quarter).ok()?;
    Some((caps["table"].to_lowercase(), period))
}
