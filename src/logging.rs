//! Logging and tracing initialization.
//!
//! Structured logging through the `tracing` ecosystem, as pretty console
//! output or JSON. The interactive UI owns the terminal, so in that mode
//! logs are written to a file instead.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for the logging system.
#[derive(Default)]
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
    /// Append logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

/// Where the interactive UI writes its log.
pub fn default_tui_log_path() -> PathBuf {
    std::env::temp_dir().join("allure-lite.log")
}

/// Initialize the tracing subscriber with the given configuration.
///
/// Call once, early in main(), after config is loaded. The level can be
/// overridden at runtime via the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```ignore
/// // Verbose console output
/// allure_lite::logging::init(LogConfig { verbose: true, ..Default::default() })?;
///
/// // JSON lines into a file while the TUI is up
/// allure_lite::logging::init(LogConfig {
///     json: true,
///     file: Some(allure_lite::logging::default_tui_log_path()),
///     ..Default::default()
/// })?;
/// ```
pub fn init(config: LogConfig) -> std::io::Result<()> {
    let env_filter = env_filter(config.verbose);

    match config.file {
        Some(path) => {
            let writer = Mutex::new(open_log_file(&path)?);
            if config.json {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        fmt::layer()
                            .json()
                            .with_span_events(FmtSpan::CLOSE)
                            .with_current_span(true)
                            .with_target(true)
                            .with_writer(writer),
                    )
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().with_ansi(false).with_writer(writer))
                    .init();
            }
        }
        None if config.json => {
            // JSON output for structured logging / log aggregation
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_span_events(FmtSpan::CLOSE)
                        .with_current_span(true)
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        None => {
            // Pretty console output for human readability
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
    Ok(())
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "allure_lite={}",
            default_level.as_str().to_lowercase()
        ))
    })
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_with_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("allure-lite.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn tui_log_lives_in_temp_dir() {
        assert!(default_tui_log_path().starts_with(std::env::temp_dir()));
    }
}
