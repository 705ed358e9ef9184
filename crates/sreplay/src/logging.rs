//! Logging setup using tracing_subscriber

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{Directive, LevelFilter};

static SREPLAY_LOG_ENV_VAR: &str = "SREPLAY_LOG";

/// Crates whose level `SREPLAY_LOG` controls
const SREPLAY_CRATES: &[&str] = &["schema_replay_core", "sreplay"];

/// Initialize the global subscriber, writing to stderr
///
/// Safe to call more than once; only the first call installs it.
pub fn init(verbose: bool) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (env_filter, level) = env_filter_and_log_level(verbose);

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();

        tracing::debug!("log level: {}", level);
    });
}

fn env_filter_and_log_level(verbose: bool) -> (EnvFilter, String) {
    let directive_string = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let log_level = std::env::var(SREPLAY_LOG_ENV_VAR).ok();
    build_filter(&directive_string, log_level, verbose)
}

fn build_filter(
    directive_string: &str,
    log_level: Option<String>,
    verbose: bool,
) -> (EnvFilter, String) {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .parse_lossy(directive_string);

    let default_level = if verbose { "debug" } else { "info" };
    let log_level = log_level.unwrap_or_else(|| default_level.to_string());

    for crate_name in SREPLAY_CRATES {
        // RUST_LOG wins for crates it names
        if directive_string.contains(&format!("{crate_name}=")) {
            continue;
        }
        match format!("{crate_name}={log_level}").parse::<Directive>() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring invalid {SREPLAY_LOG_ENV_VAR} value '{log_level}': {e}"),
        }
    }

    (env_filter, log_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sreplay_log_sets_crate_level() {
        let (filter, level) = build_filter("", Some("warn".to_string()), true);
        assert_eq!(level, "warn");
        let rendered = filter.to_string();
        assert!(rendered.contains("schema_replay_core=warn"));
        assert!(rendered.contains("sreplay=warn"));
    }

    #[test]
    fn test_verbose_default() {
        let (filter, level) = build_filter("", None, true);
        assert_eq!(level, "debug");
        assert!(filter.to_string().contains("sreplay=debug"));

        let (_, level) = build_filter("", None, false);
        assert_eq!(level, "info");
    }

    #[test]
    fn test_rust_log_wins_for_named_crate() {
        let (filter, _) = build_filter("sreplay=trace", Some("warn".to_string()), false);
        let rendered = filter.to_string();
        assert!(rendered.contains("sreplay=trace"));
        assert!(!rendered.contains("sreplay=warn"));
        assert!(rendered.contains("schema_replay_core=warn"));
    }

    #[test]
    fn test_invalid_level_is_ignored() {
        let (filter, _) = build_filter("", Some("loud!".to_string()), false);
        assert!(!filter.to_string().contains("sreplay="));
    }
}
