//! Discovery of quarterly extract files
//!
//! Scans a directory of delimited quarterly files (`DEMO12Q4.txt`,
//! `drug_2013q1.csv`, ...), samples each file's header and first rows,
//! infers a layout per file and resolves the layouts of each table into
//! versioned windows.

mod error;
mod naming;
mod sample;
mod scan;

pub use error::DiscoveryError;
pub use naming::{ExtractFile, parse_extract_name};
pub use sample::{DEFAULT_DELIMITER, sample_file, sample_reader};
pub use scan::{DiscoveryConfig, DiscoveryReport, FileFailure, discover};
