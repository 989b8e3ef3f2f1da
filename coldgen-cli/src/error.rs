//! Error types for the CLI.
//!
//! Everything the core can fail with arrives as [`GenError`]; this module
//! adds configuration, definition loading and logging failures on top.

use std::path::PathBuf;

use coldgen::GenError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error loading configuration or a definition document.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error raised by a generator run.
    #[error("Failed to generate: {0}")]
    Generate(#[from] GenError),

    /// The logging system could not be set up.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    /// Validation failed (generated output out of date, refused overwrite).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            _ => 1,
        }
    }
}

/// Error loading configuration or definition documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required file does not exist.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid JSON syntax.
    #[error("Invalid JSON in {path}: {message}")]
    InvalidJson { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading a file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn invalid_toml(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_json(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidJson {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Error while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {message}")]
    Filter { directive: String, message: String },

    /// The log directory could not be created.
    #[error("Failed to create log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rolling file appender could not be built.
    #[error("Rolling file appender error: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    /// A global subscriber is already installed.
    #[error("Tracing subscriber error: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
