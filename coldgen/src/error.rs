//! Error types for the generator core.
//!
//! Errors are split by concern and aggregated into [`GenError`]. Anything
//! returned as `Err` aborts the current run; recoverable problems (a failed
//! file write, an unresolved import) are logged and recorded by the emitter
//! run instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, GenError>;

/// Main error type for generation.
#[derive(Debug, Error)]
pub enum GenError {
    /// The domain document is malformed or inconsistent.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// A type registry document is malformed.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An emitter could not render its output.
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),

    /// The output tree could not be prepared or written.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

/// Errors raised while loading or querying the domain model.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced class is not declared anywhere in the tree.
    #[error("Class '{name}' is not defined in the domain document")]
    ClassNotFound { name: String },

    /// The same class name appears twice.
    #[error("Class '{name}' is declared twice: in '{first}' and in '{second}'")]
    DuplicateClass {
        name: String,
        first: String,
        second: String,
    },

    /// An enum-only accessor was used on a regular class.
    #[error("Class '{name}' is not an ENUM class")]
    NotAnEnum { name: String },

    /// A node or field has the wrong shape.
    #[error("Invalid definition at '{path}': {message}")]
    InvalidNode { path: String, message: String },

    /// The extends chain loops back on itself.
    #[error("Cyclic inheritance detected: {}", .chain.join(" -> "))]
    CyclicInheritance { chain: Vec<String> },

    /// A generic bound names neither a class nor a registry type.
    #[error("Class '{class}' references unknown type '{reference}'")]
    UnresolvedReference { class: String, reference: String },

    /// A `Set`/`List` attribute does not name its element type.
    #[error("Attribute '{attribute}' of class '{class}' is a container without an element type")]
    MissingElementType { class: String, attribute: String },
}

/// Errors raised while loading a type registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The table is not a JSON object.
    #[error("Registry '{table}' must be a JSON object")]
    NotAnObject { table: String },

    /// An entry has an unsupported shape.
    #[error("Invalid entry '{key}' in registry '{table}': {message}")]
    InvalidEntry {
        table: String,
        key: String,
        message: String,
    },
}

/// Errors raised while rendering output.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The build descriptor template could not be rendered.
    #[error("Failed to render descriptor: {message}")]
    Descriptor { message: String },

    /// A project configuration document could not be serialized.
    #[error("Failed to serialize {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required setting is missing or invalid.
    #[error("Invalid settings for '{key}': {message}")]
    Settings { key: String, message: String },
}

/// Errors raised while touching the output tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to remove a previous output tree.
    #[error("Failed to clean directory {path}: {source}")]
    CleanDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DomainError {
    /// Create a class not found error.
    pub fn class_not_found(name: impl Into<String>) -> Self {
        Self::ClassNotFound { name: name.into() }
    }

    /// Create an invalid node error.
    pub fn invalid_node(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Create an invalid entry error.
    pub fn invalid_entry(
        table: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidEntry {
            table: table.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

impl EmitError {
    /// Create a descriptor rendering error.
    pub fn descriptor(message: impl Into<String>) -> Self {
        Self::Descriptor {
            message: message.into(),
        }
    }

    /// Create a settings error.
    pub fn settings(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Settings {
            key: key.into(),
            message: message.into(),
        }
    }
}
