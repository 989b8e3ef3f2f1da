//! # coldgen
//!
//! Generate a Java class library, a TypeScript model library and a mongoose
//! schema library from one declarative domain document.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`domain`] - Domain document parsing, the class index and the resolver
//! - [`registry`] - Per-target primitive type alias tables
//! - [`settings`] - Immutable run settings and the generation context
//! - [`render`] - Comment blocks, descriptor markup and naming helpers
//! - [`emitter`] - The `Emitter` trait, the run loop and the three targets
//! - [`writer`] - Output tree preparation and dry-run support
//! - [`error`] - Error types and handling
//!
//! ## Example
//!
//! ```rust,no_run
//! use coldgen::{
//!     run_emitter, DomainModel, FileWriter, GenerationContext, ModelEmitter, NoopProgress,
//!     ScriptTarget, Settings, TypeRegistries,
//! };
//! use serde_json::json;
//!
//! let model = DomainModel::from_value(&json!({
//!     "zoo": {"Animal": {"type": "obj", "attributes": {"name": {"type": "String"}}}}
//! }))?;
//! let ctx = GenerationContext::new(model, TypeRegistries::default(), Settings::new("1.0.0"));
//! let emitter = ModelEmitter::new(ScriptTarget::new("generated/javascript", json!({}), json!({})));
//!
//! let report = run_emitter(&emitter, &ctx, &FileWriter::new(false), &mut NoopProgress)?;
//! assert_eq!(report.processed, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod domain;
pub mod emitter;
pub mod error;
pub mod registry;
pub mod render;
pub mod settings;
pub mod writer;

// Re-export main types for convenience
pub use domain::{ClassEntry, DomainModel, Resolver};
pub use emitter::{
    run_emitter, ClassEmitter, EmitReport, Emitter, ModelEmitter, NoopProgress, ProgressSink,
    RenderedFile, SchemaEmitter,
};
pub use error::{CoreResult, DomainError, EmitError, GenError, RegistryError, WriteError};
pub use registry::{RegistryEntry, TypeRegistries, TypeRegistry};
pub use settings::{GenerationContext, JavaTarget, ScriptTarget, Settings};
pub use writer::{FileWriter, WriteResult};
