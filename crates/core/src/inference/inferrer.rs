//! Column type inference engine

use serde::{Deserialize, Serialize};

use super::config::InferenceConfig;
use super::types::ColumnType;

/// Statistics gathered while inferring one column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStats {
    /// Values inspected, including nulls
    pub values_seen: usize,
    /// Values that were null or empty
    pub null_count: usize,
    /// Longest non-empty value, in characters
    pub max_length: u32,
}

/// Accumulates raw values for one column and infers its type
///
/// Values are fed in source order. Once `sample_rows` values have been seen,
/// further values are ignored.
#[derive(Debug, Clone)]
pub struct ColumnInferrer {
    config: InferenceConfig,
    stats: ColumnStats,
    /// Every non-empty value so far has been a canonical integer
    integer_candidate: bool,
    /// Every non-empty value so far has been a finite decimal number
    float_candidate: bool,
}

impl Default for ColumnInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnInferrer {
    /// Create an inferrer with default configuration
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create an inferrer with custom configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            config,
            stats: ColumnStats::default(),
            integer_candidate: true,
            float_candidate: true,
        }
    }

    /// Whether the sample is full
    pub fn is_saturated(&self) -> bool {
        self.stats.values_seen >= self.config.sample_rows
    }

    /// Feed one raw value; `None` and `Some("")` are nulls
    ///
    /// Returns `false` once the sample is full and the value was ignored.
    pub fn observe(&mut self, value: Option<&str>) -> bool {
        if self.is_saturated() {
            return false;
        }
        self.stats.values_seen += 1;

        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.stats.null_count += 1;
                return true;
            }
        };

        let length = u32::try_from(value.chars().count()).unwrap_or(u32::MAX);
        self.stats.max_length = self.stats.max_length.max(length);

        if self.integer_candidate && !is_canonical_integer(value) {
            self.integer_candidate = false;
        }
        if self.float_candidate && !is_decimal(value) {
            self.float_candidate = false;
        }

        true
    }

    /// Statistics gathered so far
    pub fn stats(&self) -> &ColumnStats {
        &self.stats
    }

    /// Number of non-null values seen
    pub fn present_count(&self) -> usize {
        self.stats.values_seen - self.stats.null_count
    }

    /// Infer the column type from the values seen so far
    pub fn finish(&self) -> ColumnType {
        if self.present_count() == 0 {
            return ColumnType::Varchar(self.config.default_varchar_length);
        }
        if self.integer_candidate {
            return ColumnType::BigInt;
        }
        if self.float_candidate {
            return ColumnType::Float;
        }
        ColumnType::Varchar(round_varchar_length(self.stats.max_length, &self.config))
    }
}

/// Infer a column type from raw values using the default configuration
pub fn infer<I, S>(values: I) -> ColumnType
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    infer_with_config(values, &InferenceConfig::default())
}

/// Infer a column type from raw values
pub fn infer_with_config<I, S>(values: I, config: &InferenceConfig) -> ColumnType
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut inferrer = ColumnInferrer::with_config(config.clone());
    for value in values {
        if !inferrer.observe(Some(value.as_ref())) {
            break;
        }
    }
    inferrer.finish()
}

/// Round an observed string length to the emitted `varchar` length
///
/// The length is capped at `max_varchar_length`, then rounded up to the next
/// multiple of 10 (up to 100), 100 (up to 1000), or 1000 beyond that.
pub fn round_varchar_length(length: u32, config: &InferenceConfig) -> u32 {
    let max = config.max_varchar_length.max(1);
    let capped = length.clamp(1, max);
    let step = if capped <= 100 {
        10
    } else if capped <= 1000 {
        100
    } else {
        1000
    };
    capped
        .div_ceil(step)
        .saturating_mul(step)
        .min(max)
}

/// Parses as `i64` and renders back to exactly the same text
///
/// Leading zeros, `+` signs, whitespace and `-0` are all rejected.
fn is_canonical_integer(value: &str) -> bool {
    value
        .parse::<i64>()
        .map(|n| n.to_string() == value)
        .unwrap_or(false)
}

/// Parses as a finite decimal number
fn is_decimal(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(f64::is_finite)
        .unwrap_or(false)
}
