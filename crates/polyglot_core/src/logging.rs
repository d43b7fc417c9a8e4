//! Subscriber setup for binaries embedding the localizer.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the application's job. `POLYGLOT_LOG` overrides the configured level.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable overriding [`LoggingConfig::level`]
pub const LOG_ENV: &str = "POLYGLOT_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownFormat(String),

    #[error("JSON log output requires the `logging-json` feature")]
    JsonUnavailable,

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggingError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `polyglot_core=debug`
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            ansi: true,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let directive = filter_directive(config, std::env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        filter: directive.clone(),
        reason: e.to_string(),
    })?;

    let writer = match config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_ansi(config.ansi).with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_ansi(config.ansi).with_writer(writer))
            .try_init(),
        #[cfg(feature = "logging-json")]
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        #[cfg(not(feature = "logging-json"))]
        LogFormat::Json => return Err(LoggingError::JsonUnavailable),
    };

    installed.map_err(|e| LoggingError::Init(e.to_string()))
}

// A non-blank environment override wins over the configured level
fn filter_directive(config: &LoggingConfig, env_override: Option<String>) -> String {
    env_override
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| config.level.clone())
}
