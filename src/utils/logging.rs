//! Structured logging setup.
//!
//! Installs a global `tracing-subscriber` fmt subscriber from a
//! [`LoggingConfig`]. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use crate::error::{constants, CodecError, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed or the log file cannot be opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(config.log_level).into())
    });

    let file = match (config.log_to_file, config.log_file_path.as_deref()) {
        (true, Some(path)) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    CodecError::ConfigError(format!("{}: {path}: {e}", constants::ERR_LOGGING_INIT))
                })?,
        ),
        (true, None) => {
            return Err(CodecError::ConfigError(format!(
                "{}: log_to_file set without log_file_path",
                constants::ERR_LOGGING_INIT
            )))
        }
        _ => None,
    };

    match (config.log_to_console, file) {
        (true, Some(file)) => install(
            filter,
            std::io::stdout.and(Mutex::new(file)),
            config.json_format,
        ),
        (false, Some(file)) => install(filter, Mutex::new(file), config.json_format),
        (_, None) => install(filter, std::io::stdout, config.json_format),
    }?;

    tracing::info!(app = %config.app_name, "Logging initialized");
    Ok(())
}

fn install<W>(filter: EnvFilter, writer: W, json: bool) -> Result<()>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| CodecError::ConfigError(format!("{}: {e}", constants::ERR_LOGGING_INIT)))
}
