//! Tracing subscriber setup.
//!
//! Console output is a compact fmt layer on stderr. When file logging is
//! enabled, a daily-rotated file is written through a non-blocking worker
//! whose guard must outlive the run.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LogConfig;
use crate::error::LoggingError;

const LOG_FILE_PREFIX: &str = "coldgen";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Handle to the installed subscriber. Dropping it flushes the file worker.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Filter directive for the configured level, `debug` when verbose.
pub fn default_directive(config: &LogConfig, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    }
}

/// Build the filter: `RUST_LOG` wins over the configured directive.
pub fn build_env_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(directive).map_err(|e| LoggingError::Filter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init(config: &LogConfig, verbose: bool) -> Result<LogGuard, LoggingError> {
    let filter = build_env_filter(&default_directive(config, verbose))?;

    let mut layers = vec![layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .boxed()];

    let guard = if config.enabled {
        fs::create_dir_all(&config.dir).map_err(|source| LoggingError::Directory {
            path: config.dir.clone(),
            source,
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(MAX_LOG_FILES)
            .build(&config.dir)?;

        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        layers.push(layer().with_writer(non_blocking).with_ansi(false).boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()?;

    Ok(LogGuard { _guard: guard })
}
