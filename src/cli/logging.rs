//! Logging initialization

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Where log output goes for this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// The TUI owns the terminal; nothing is logged unless `--debug` is given
    Tui,
    /// Headless commands log warnings to stderr
    Headless,
}

/// Initialize logging based on the debug flag and the command being run
///
/// Returns the log file path if debug logging is enabled. `RUST_LOG` overrides
/// the default level in every mode.
pub fn init_logging(debug: bool, target: LogTarget) -> Result<Option<PathBuf>> {
    if debug {
        let (file, path) = tempfile::Builder::new()
            .prefix("launchdeck-")
            .suffix(".log")
            .tempfile()
            .context("Failed to create log file")?
            .keep()
            .context("Failed to keep log file")?;

        // Write to a file so the TUI can use stdout/stderr without interference
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_env_filter(env_filter("debug"))
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .init();

        return Ok(Some(path));
    }

    if target == LogTarget::Headless {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter("warn"))
            .with_target(false)
            .init();
    }

    Ok(None)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
