//! Definition document loading.
//!
//! Reads the domain document and the three target definition documents
//! named by [`DefinitionConfig`], then assembles the generation context and
//! the per-target output settings.

use std::path::{Path, PathBuf};

use coldgen::{
    ClassEmitter, DomainModel, Emitter, GenError, GenerationContext, JavaTarget, ModelEmitter,
    SchemaEmitter, ScriptTarget, TypeRegistries, TypeRegistry,
};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{Config, DefinitionConfig};
use crate::error::{CliResult, ConfigError};

/// Generation target selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum Target {
    /// Java classes plus `pom.xml`.
    Java,
    /// TypeScript interfaces and classes.
    Model,
    /// Mongoose schemas.
    Schema,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Java, Target::Model, Target::Schema];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Model => "model",
            Self::Schema => "schema",
        }
    }
}

/// The parsed definition documents.
#[derive(Debug, Clone)]
pub struct Definitions {
    pub domain: Value,
    pub java: Value,
    pub javascript: Value,
    pub typescript: Value,
}

impl Definitions {
    /// Load every document. Domain, Java and JavaScript documents are
    /// required; the TypeScript document falls back to an empty object.
    pub fn load(config: &DefinitionConfig) -> CliResult<Self> {
        let typescript_path = config.typescript_path();
        let typescript = if typescript_path.exists() {
            read_json(&typescript_path)?
        } else {
            debug!(path = %typescript_path.display(), "no typescript document, using defaults");
            Value::Object(Map::new())
        };

        Ok(Self {
            domain: read_json(&config.domain_path())?,
            java: read_json(&config.java_path())?,
            javascript: read_json(&config.javascript_path())?,
            typescript,
        })
    }

    /// Build the three registries from the target documents.
    pub fn registries(&self) -> CliResult<TypeRegistries> {
        let java = TypeRegistry::from_dependency_table("java", section(&self.java, "dependencyMap"))
            .map_err(GenError::from)?;

        let mut model =
            TypeRegistry::from_alias_table("model", section(&self.javascript, "javascriptTypeMap"))
                .map_err(GenError::from)?;
        model
            .attach_dependencies(section(&self.javascript, "dependencyMap"))
            .map_err(GenError::from)?;

        let schema =
            TypeRegistry::from_alias_table("schema", section(&self.javascript, "mongooseTypeMap"))
                .map_err(GenError::from)?;

        debug!(
            java = java.len(),
            model = model.len(),
            schema = schema.len(),
            "registries loaded"
        );
        Ok(TypeRegistries::new(java, model, schema))
    }

    /// Parse the domain document and pair it with registries and settings.
    pub fn context(&self, config: &Config) -> CliResult<GenerationContext> {
        let model = DomainModel::from_value(&self.domain).map_err(GenError::from)?;
        info!(
            classes = model.class_count(),
            packages = model.package_count(),
            "domain model loaded"
        );
        Ok(GenerationContext::new(
            model,
            self.registries()?,
            config.to_settings(),
        ))
    }

    /// Build the emitter for one target, rooted under the configured output
    /// directory.
    pub fn emitter(&self, target: Target, config: &Config) -> CliResult<Box<dyn Emitter>> {
        let emitter: Box<dyn Emitter> = match target {
            Target::Java => {
                let java = JavaTarget::new(config.target.java_root(), self.maven()?)
                    .with_annotation_defaults(section(&self.java, "annotateDefaultVal"))
                    .map_err(GenError::from)?;
                Box::new(ClassEmitter::new(java))
            }
            Target::Model => Box::new(ModelEmitter::new(ScriptTarget::new(
                config.target.model_root(),
                section(&self.javascript, "packageJavascript").clone(),
                self.tsconfig(),
            ))),
            Target::Schema => Box::new(SchemaEmitter::new(ScriptTarget::new(
                config.target.schema_root(),
                section(&self.javascript, "packageMongoose").clone(),
                self.tsconfig(),
            ))),
        };
        Ok(emitter)
    }

    fn maven(&self) -> CliResult<Value> {
        match self.java.get("maven") {
            Some(maven @ Value::Object(_)) => Ok(maven.clone()),
            _ => Err(ConfigError::invalid_value("maven", "java document needs a 'maven' object").into()),
        }
    }

    fn tsconfig(&self) -> Value {
        match section(&self.typescript, "tsconfig") {
            Value::Null => Value::Object(Map::new()),
            tsconfig => tsconfig.clone(),
        }
    }
}

static ABSENT: Value = Value::Null;

/// A top-level key of a definition document, `null` when absent.
fn section<'a>(doc: &'a Value, key: &str) -> &'a Value {
    doc.get(key).unwrap_or(&ABSENT)
}

fn read_json(path: &Path) -> CliResult<Value> {
    if !path.exists() {
        return Err(ConfigError::not_found(PathBuf::from(path)).into());
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = serde_json::from_str(&content)
        .map_err(|e| ConfigError::invalid_json(path, e.to_string()))?;
    Ok(value)
}
