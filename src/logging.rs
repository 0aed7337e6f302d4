//! Logging setup for the command-line front end.
//!
//! Logs always go to stderr, so stdout stays clean for previews and chart
//! JSON. File logging is opt-in and rotates daily in the platform data
//! directory, keeping 10 files.
//!
//! ```no_run
//! use datasweeper::logging::{self, LoggingOptions};
//!
//! logging::init(&LoggingOptions::default())?;
//! tracing::info!("App started");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Filter used when `RUST_LOG` is unset; `info` when `None`
    pub default_filter: Option<String>,
    /// Also write to rolling files under [`log_dir`]
    pub log_to_file: bool,
}

/// Gets the log directory path based on platform conventions
///
/// Returns:
/// - Windows: `%APPDATA%/datasweeper/logs`
/// - macOS: `~/Library/Application Support/datasweeper/logs`
/// - Linux: `~/.local/share/datasweeper/logs`
pub fn log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(base_dir.join("datasweeper").join("logs"))
}

fn env_filter(options: &LoggingOptions) -> Result<EnvFilter> {
    let fallback = options.default_filter.as_deref().unwrap_or("info");
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .context("Failed to create env filter")
}

fn file_appender() -> Result<(RollingFileAppender, PathBuf)> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("datasweeper")
        .filename_suffix("log")
        .build(&dir)
        .context("Failed to create log file appender")?;
    Ok((appender, dir))
}

/// Install the global subscriber. Call once at startup.
///
/// # Errors
///
/// Returns error if the filter is invalid, the log directory cannot be
/// created, or a subscriber is already installed.
pub fn init(options: &LoggingOptions) -> Result<()> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, dir) = if options.log_to_file {
        let (appender, dir) = file_appender()?;
        let layer = fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
            .with_writer(appender);
        (Some(layer), Some(dir))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter(options)?)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(dir) = dir {
        tracing::debug!("Logging to {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_app_scoped() {
        let Ok(dir) = log_dir() else {
            // no data directory in this environment
            return;
        };
        assert!(dir.ends_with("datasweeper/logs"));
    }

    #[test]
    fn test_default_filter_override() {
        let options = LoggingOptions {
            default_filter: Some("datasweeper=debug,warn".to_owned()),
            log_to_file: false,
        };
        assert!(env_filter(&options).is_ok());
        assert!(env_filter(&LoggingOptions::default()).is_ok());
    }
}
