//! # coldgen-cli
//!
//! CLI library for generating domain libraries from a coldgen domain
//! document.
//!
//! This crate provides everything the `coldgen` binary does apart from
//! argument parsing and console output: configuration, definition loading,
//! logging setup, progress reporting and the command workflows.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`definitions`] - Definition documents, registries and emitter setup
//! - [`runner`] - Generate, check and stats workflows
//! - [`logging`] - Tracing subscriber and log file setup
//! - [`progress`] - Progress bar reporting
//! - [`error`] - Error types and handling

pub mod config;
pub mod definitions;
pub mod error;
pub mod logging;
pub mod progress;
pub mod runner;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use definitions::{Definitions, Target};
pub use error::{CliError, CliResult};
pub use progress::BarProgress;
pub use runner::{Drift, Project, Stats};
