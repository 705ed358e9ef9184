//! `sreplay discover`: infer versioned layouts from quarterly extracts

use std::path::PathBuf;

use clap::Args;
use schema_replay_core::discovery::{DEFAULT_DELIMITER, DiscoveryConfig, discover};
use schema_replay_core::inference::{DEFAULT_SAMPLE_ROWS, InferenceConfig};

use crate::error::CliError;
use crate::output::{Format, emit};

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Directory holding the unpacked quarterly files
    pub source: PathBuf,

    /// Glob relative to the source directory
    #[arg(long, default_value = "**/*")]
    pub pattern: String,

    /// Field delimiter of the extracts
    #[arg(long, default_value_t = DEFAULT_DELIMITER)]
    pub delimiter: char,

    /// Rows sampled per file
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,

    /// Schema configuration file to write (.json, .yaml or .yml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format when printing to stdout
    #[arg(long, value_enum, default_value = "json")]
    pub format: Format,
}

/// Handle the `discover` command
pub fn handle_discover(args: &DiscoverArgs) -> Result<(), CliError> {
    let config = DiscoveryConfig::new(&args.source)
        .with_pattern(&args.pattern)
        .with_delimiter(args.delimiter)
        .with_inference(InferenceConfig::builder().sample_rows(args.sample_rows).build());

    eprintln!("Scanning {} ...", args.source.display());
    let report = discover(&config)?;

    eprintln!("  Files sampled: {}", report.files_scanned);
    eprintln!("  Files skipped (unrecognised names): {}", report.files_skipped.len());
    for failure in &report.failures {
        eprintln!("  Warning: {}: {}", failure.path.display(), failure.reason);
    }
    for table in report.config.tables() {
        eprintln!(
            "  {table}: {} version(s)",
            report.config.versions(table).len()
        );
    }

    if report.config.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "No quarterly extracts found under {} matching '{}'",
            args.source.display(),
            args.pattern
        )));
    }

    match &args.output {
        Some(path) => {
            report.config.save(path)?;
            eprintln!("Schema configuration written to: {}", path.display());
        }
        None => {
            let text = match args.format {
                Format::Yaml => report.config.to_yaml_string()?,
                Format::Json | Format::Text => report.config.to_json_string()?,
            };
            emit(None, &text)?;
        }
    }

    Ok(())
}
