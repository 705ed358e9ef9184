//! Configuration for column type inference

use serde::{Deserialize, Serialize};

/// Rows sampled from the start of each source file
pub const DEFAULT_SAMPLE_ROWS: usize = 100;

/// Length used when a column has no usable values
pub const DEFAULT_VARCHAR_LENGTH: u32 = 100;

/// Cap applied to inferred string lengths
pub const MAX_VARCHAR_LENGTH: u32 = 1000;

/// Configuration for column type inference
///
/// Inference only inspects the first `sample_rows` values of a column. A value
/// past the sample that violates the inferred type goes undetected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    /// Maximum number of values inspected per column
    pub sample_rows: usize,

    /// Length emitted for columns with no non-empty values
    pub default_varchar_length: u32,

    /// Upper bound for inferred string lengths
    pub max_varchar_length: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            default_varchar_length: DEFAULT_VARCHAR_LENGTH,
            max_varchar_length: MAX_VARCHAR_LENGTH,
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the number of sampled rows (at least 1)
    pub fn sample_rows(mut self, rows: usize) -> Self {
        self.config.sample_rows = rows.max(1);
        self
    }

    /// Set the fallback string length
    pub fn default_varchar_length(mut self, length: u32) -> Self {
        self.config.default_varchar_length = length.max(1);
        self
    }

    /// Set the string length cap
    pub fn max_varchar_length(mut self, length: u32) -> Self {
        self.config.max_varchar_length = length.max(1);
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
