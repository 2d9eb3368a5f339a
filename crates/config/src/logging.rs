//! Logging configuration for the jconfig CLI
//!
//! Compact terminal output plus an optional debug log file, using tracing.

use crate::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging and timestamps
/// * `log_file` - Optional path to append debug logs to
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode, also writing to a file
/// init(true, Some(Path::new("jconfig.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // RUST_LOG wins over the verbose flag
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(format!(
                "jconfig={level},jconfig_engine={level},jconfig_core={level},jconfig_config={level}"
            ))
        })
        .map_err(|e| jconfig_core::Error::Message(format!("Invalid log filter: {e}")))?;

    let file_layer = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            let filter = EnvFilter::try_new("debug")
                .map_err(|e| jconfig_core::Error::Message(format!("Invalid log filter: {e}")))?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(filter),
            )
        }
        None => None,
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    if verbose {
        tracing_subscriber::registry()
            .with(file_layer)
            .with(stdout_layer.with_filter(env_filter))
            .init();
    } else {
        // No timestamps in normal mode
        tracing_subscriber::registry()
            .with(file_layer)
            .with(stdout_layer.without_time().with_filter(env_filter))
            .init();
    }

    Ok(())
}
