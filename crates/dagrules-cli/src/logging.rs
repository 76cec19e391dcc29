//! Structured logging with tracing
//!
//! Logs go to stderr so stdout carries only the report.

use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::constants::LOG_ENV_VAR;
use crate::settings::{LoggingSettings, SettingsError};

/// Initialize logging with the provided settings
///
/// `DAGRULES_LOG` overrides the configured level. A subscriber that is
/// already installed is kept.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), SettingsError> {
    let level = parse_log_level(&settings.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = Registry::default().with(filter);
    let installed = if settings.json_format {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if installed.is_ok() {
        debug!("Logging initialized with level: {}", level);
    }
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level, SettingsError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(SettingsError::InvalidLogLevel {
            level: level.to_string(),
        }),
    }
}
