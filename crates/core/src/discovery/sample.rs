//! Bounded sampling of delimited extract files

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::error::DiscoveryError;
use crate::inference::{ColumnInferrer, InferenceConfig};
use crate::versioning::ColumnSchema;

/// Field delimiter of the quarterly ASCII extracts
pub const DEFAULT_DELIMITER: char = '$';

/// Infer the layout of one extract file
pub fn sample_file(
    path: &Path,
    delimiter: char,
    config: &InferenceConfig,
) -> Result<ColumnSchema, DiscoveryError> {
    let file = File::open(path).map_err(|source| DiscoveryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = sample_reader(BufReader::new(file), delimiter, config)
        .map_err(|source| DiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| DiscoveryError::MissingHeader(path.to_path_buf()))?;
    debug!(path = %path.display(), columns = schema.len(), "Sampled extract");
    Ok(schema)
}

/// Infer a layout from delimited text
///
/// The first line is the header; names are lower-cased and a leading byte
/// order mark is dropped. At most `config.sample_rows` data rows are read.
/// Missing trailing fields count as nulls, blank lines are skipped, and
/// bytes that are not UTF-8 are replaced. Returns `None` without a header.
pub fn sample_reader<R: BufRead>(
    mut reader: R,
    delimiter: char,
    config: &InferenceConfig,
) -> std::io::Result<Option<ColumnSchema>> {
    let mut buf = Vec::new();

    let Some(header) = read_line(&mut reader, &mut buf)? else {
        return Ok(None);
    };
    let header = header.trim_start_matches('\u{feff}');
    if header.trim().is_empty() {
        return Ok(None);
    }

    let columns: Vec<(usize, String)> = header
        .split(delimiter)
        .enumerate()
        .map(|(i, name)| (i, name.trim().to_lowercase()))
        .filter(|(_, name)| !name.is_empty())
        .collect();
    let mut inferrers: Vec<ColumnInferrer> = columns
        .iter()
        .map(|_| ColumnInferrer::with_config(config.clone()))
        .collect();

    let mut rows = 0usize;
    while rows < config.sample_rows {
        let Some(line) = read_line(&mut reader, &mut buf)? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        for ((index, _), inferrer) in columns.iter().zip(inferrers.iter_mut()) {
            inferrer.observe(fields.get(*index).map(|f| f.trim()));
        }
        rows += 1;
    }

    Ok(Some(
        columns
            .into_iter()
            .zip(inferrers)
            .map(|((_, name), inferrer)| (name, inferrer.finish()))
            .collect(),
    ))
}

/// Next line without its terminator, decoded lossily
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
