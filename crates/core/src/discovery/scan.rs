//! Directory scan producing a versioned schema configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, info_span, warn};

use super::error::DiscoveryError;
use super::naming::ExtractFile;
use super::sample::{DEFAULT_DELIMITER, sample_file};
use crate::inference::InferenceConfig;
use crate::period::Period;
use crate::versioning::{ColumnSchema, SchemaConfig, resolve};

/// Settings for one discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Directory holding the unpacked extracts
    pub source: PathBuf,
    /// Glob relative to `source`
    pub pattern: String,
    pub delimiter: char,
    pub inference: InferenceConfig,
}

impl DiscoveryConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            pattern: "**/*".to_string(),
            delimiter: DEFAULT_DELIMITER,
            inference: InferenceConfig::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }
}

/// A recognised file that could not be sampled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    pub config: SchemaConfig,
    /// Files sampled successfully
    pub files_scanned: usize,
    /// Files whose names are not quarterly extract names
    pub files_skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    pub duration: Duration,
}

impl DiscoveryReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Scan `config.source`, infer each extract's layout and resolve versions
///
/// Files are sampled in parallel. Each table's observations are then
/// grouped into schema versions independently.
pub fn discover(config: &DiscoveryConfig) -> Result<DiscoveryReport, DiscoveryError> {
    let _span = info_span!("discover", source = %config.source.display()).entered();
    let start = Instant::now();

    std::fs::metadata(&config.source).map_err(|source| DiscoveryError::SourceNotAccessible {
        path: config.source.clone(),
        source,
    })?;

    let (extracts, files_skipped) = list_extracts(&config.source, &config.pattern)?;
    info!(
        extracts = extracts.len(),
        skipped = files_skipped.len(),
        "Found quarterly extracts"
    );

    let sampled: Vec<(ExtractFile, Result<ColumnSchema, DiscoveryError>)> = extracts
        .into_par_iter()
        .map(|file| {
            let schema = sample_file(&file.path, config.delimiter, &config.inference);
            (file, schema)
        })
        .collect();

    let mut by_table: BTreeMap<String, Vec<(Period, ColumnSchema)>> = BTreeMap::new();
    let mut failures = Vec::new();
    let mut files_scanned = 0;
    for (file, result) in sampled {
        match result {
            Ok(schema) => {
                files_scanned += 1;
                by_table
                    .entry(file.table)
                    .or_default()
                    .push((file.period, schema));
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Skipping unreadable extract");
                failures.push(FileFailure {
                    path: file.path,
                    reason: e.to_string(),
                });
            }
        }
    }

    let resolved: Vec<_> = by_table
        .into_par_iter()
        .map(|(table, observations)| {
            let versions = resolve(&table, observations);
            (table, versions)
        })
        .collect();

    let mut schema_config = SchemaConfig::new();
    for (table, versions) in resolved {
        info!(table = %table, versions = versions.len(), "Resolved table");
        schema_config.insert(&table, versions);
    }

    let duration = start.elapsed();
    info!(
        tables = schema_config.tables().count(),
        files = files_scanned,
        duration_ms = duration.as_millis() as u64,
        "Discovery complete"
    );

    Ok(DiscoveryReport {
        config: schema_config,
        files_scanned,
        files_skipped,
        failures,
        duration,
    })
}

/// Recognised extracts (sorted by path) and the other files matched
fn list_extracts(
    source: &Path,
    pattern: &str,
) -> Result<(Vec<ExtractFile>, Vec<PathBuf>), DiscoveryError> {
    let full_pattern = format!("{}/{}", source.display(), pattern);
    let entries = glob::glob(&full_pattern)
        .map_err(|e| DiscoveryError::InvalidPattern(format!("{pattern}: {e}")))?;

    let mut extracts = Vec::new();
    let mut skipped = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => match ExtractFile::from_path(&path) {
                Some(file) => extracts.push(file),
                None => skipped.push(path),
            },
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Error accessing path"),
        }
    }

    extracts.sort_by(|a, b| a.path.cmp(&b.path));
    skipped.sort();
    Ok((extracts, skipped))
}
