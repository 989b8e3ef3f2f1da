//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `coldgen.toml` files,
//! merging command-line arguments and producing the core [`Settings`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use coldgen::Settings;
use serde::Deserialize;

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "coldgen.toml";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version stamped into every package descriptor.
    pub lib_version: String,

    /// Spaces per indentation level.
    pub indentation: usize,

    /// Maximum characters per comment line.
    pub comment_width: usize,

    /// Where the definition documents live.
    pub definition: DefinitionConfig,

    /// Where generated trees are written.
    pub target: TargetConfig,

    /// Log file settings.
    pub log: LogConfig,

    /// Extra `${name}` placeholders for the POM template.
    pub variables: BTreeMap<String, String>,
}

/// Definition document locations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DefinitionConfig {
    /// Directory the other paths are relative to.
    pub base_dir: PathBuf,

    /// The domain document.
    pub domain: PathBuf,

    /// POM template, Java dependency map and annotation defaults.
    pub java: PathBuf,

    /// Model and schema type maps plus package manifests.
    pub javascript: PathBuf,

    /// tsconfig template. Optional on disk.
    pub typescript: PathBuf,
}

/// Output tree locations.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Directory the per-target directories are relative to.
    pub base_dir: PathBuf,

    /// Java class library.
    pub java_dir: PathBuf,

    /// TypeScript model library.
    pub model_dir: PathBuf,

    /// Mongoose schema library.
    pub schema_dir: PathBuf,
}

/// Log file configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Write a daily-rotated log file.
    pub enabled: bool,

    /// Directory for log files.
    pub dir: PathBuf,

    /// Default filter level when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lib_version: "1.0.0".to_string(),
            indentation: coldgen::settings::DEFAULT_INDENT,
            comment_width: coldgen::settings::DEFAULT_COMMENT_WIDTH,
            definition: DefinitionConfig::default(),
            target: TargetConfig::default(),
            log: LogConfig::default(),
            variables: BTreeMap::new(),
        }
    }
}

impl Default for DefinitionConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./definition"),
            domain: PathBuf::from("domain.json"),
            java: PathBuf::from("java.json"),
            javascript: PathBuf::from("javascript.json"),
            typescript: PathBuf::from("typescript.json"),
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./generated"),
            java_dir: PathBuf::from("java"),
            model_dir: PathBuf::from("javascript"),
            schema_dir: PathBuf::from("mongoose"),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

impl DefinitionConfig {
    pub fn domain_path(&self) -> PathBuf {
        self.base_dir.join(&self.domain)
    }

    pub fn java_path(&self) -> PathBuf {
        self.base_dir.join(&self.java)
    }

    pub fn javascript_path(&self) -> PathBuf {
        self.base_dir.join(&self.javascript)
    }

    pub fn typescript_path(&self) -> PathBuf {
        self.base_dir.join(&self.typescript)
    }
}

impl TargetConfig {
    pub fn java_root(&self) -> PathBuf {
        self.base_dir.join(&self.java_dir)
    }

    pub fn model_root(&self) -> PathBuf {
        self.base_dir.join(&self.model_dir)
    }

    pub fn schema_root(&self) -> PathBuf {
        self.base_dir.join(&self.schema_dir)
    }
}

impl Config {
    /// Check values the type system cannot.
    pub fn validate(&self) -> CliResult<()> {
        if self.lib_version.trim().is_empty() {
            return Err(ConfigError::invalid_value("lib_version", "must not be empty").into());
        }
        if self.indentation == 0 {
            return Err(ConfigError::invalid_value("indentation", "must be at least 1").into());
        }
        if self.comment_width == 0 {
            return Err(ConfigError::invalid_value("comment_width", "must be at least 1").into());
        }
        Ok(())
    }

    /// The immutable settings handed to every emitter.
    pub fn to_settings(&self) -> Settings {
        self.variables.iter().fold(
            Settings::new(self.lib_version.clone())
                .with_indent(self.indentation)
                .with_comment_width(self.comment_width),
            |settings, (name, value)| settings.with_variable(name.clone(), value.clone()),
        )
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref definition) = args.definition_dir {
            config.definition.base_dir = definition.clone();
        }

        if let Some(ref output) = args.output {
            config.target.base_dir = output.clone();
        }

        if let Some(ref version) = args.lib_version {
            config.lib_version = version.clone();
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# coldgen configuration file

# Version written into pom.xml and both package.json files
lib_version = "1.0.0"

# Spaces per indentation level in generated sources
indentation = 4

# Maximum characters per line in generated doc comments
comment_width = 80

[definition]
# Directory holding the definition documents
base_dir = "./definition"

# Domain document (packages and classes)
domain = "domain.json"

# POM template, Java dependency map and annotation defaults
java = "java.json"

# Model/schema type maps, dependency map and package manifests
javascript = "javascript.json"

# tsconfig template (optional)
typescript = "typescript.json"

[target]
# Directory that receives the generated libraries
base_dir = "./generated"

# Java class library
java_dir = "java"

# TypeScript model library
model_dir = "javascript"

# Mongoose schema library
schema_dir = "mongoose"

[log]
# Write a daily-rotated log file in addition to console output
enabled = false
dir = "logs"

# Default level when RUST_LOG is not set (trace, debug, info, warn, error)
level = "info"

[variables]
# Extra ${name} placeholders available in the POM template
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Definition directory override.
    pub definition_dir: Option<PathBuf>,

    /// Output base directory override.
    pub output: Option<PathBuf>,

    /// Library version override.
    pub lib_version: Option<String>,
}
