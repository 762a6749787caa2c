//! Logging setup
//!
//! Logging is off unless VOOZAA_LOG is set to a level (e.g. `debug`). Logs
//! go to the configured `log_file`, or to stderr when none is set.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::EnvFilter;

use voozaa_core::Config;

/// Install the global subscriber if VOOZAA_LOG is set
pub fn init(config: &Config) {
    let Ok(log_level) = std::env::var("VOOZAA_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(filter_directives(&log_level));

    match &config.log_file {
        Some(log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .try_init();

            info!("Logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

/// Filter for our own crates at the requested level
fn filter_directives(level: &str) -> String {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    format!("voozaa_core={},voozaa_cli={}", level, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives("debug"), "voozaa_core=debug,voozaa_cli=debug");
        assert_eq!(filter_directives(" "), "voozaa_core=info,voozaa_cli=info");
    }
}
