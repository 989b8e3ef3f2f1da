//! Immutable run settings and the generation context.
//!
//! Everything an emitter reads is built once by the caller and passed in by
//! reference: formatting settings, per-target output settings, the domain
//! model and the registries.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::{AnnotationArgs, DomainModel, Resolver};
use crate::error::EmitError;
use crate::registry::TypeRegistries;
use crate::render::substitute_placeholder;

/// Default indentation width in spaces.
pub const DEFAULT_INDENT: usize = 4;

/// Default maximum characters per comment line.
pub const DEFAULT_COMMENT_WIDTH: usize = 80;

/// Formatting and templating settings shared by all emitters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Version stamped into the generated project files.
    pub lib_version: String,
    /// Indentation width in spaces.
    pub indent: usize,
    /// Maximum characters per comment line.
    pub comment_width: usize,
    /// Values for `${name}` placeholders in the build descriptor.
    pub variables: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lib_version: "1.0.0".to_string(),
            indent: DEFAULT_INDENT,
            comment_width: DEFAULT_COMMENT_WIDTH,
            variables: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn new(lib_version: impl Into<String>) -> Self {
        Self {
            lib_version: lib_version.into(),
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_comment_width(mut self, width: usize) -> Self {
        self.comment_width = width;
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Placeholder values, including the library version under
    /// `libVersion` and `lib_version` unless overridden.
    pub fn placeholders(&self) -> BTreeMap<String, String> {
        let mut vars = self.variables.clone();
        for key in ["libVersion", "lib_version"] {
            vars.entry(key.to_string())
                .or_insert_with(|| self.lib_version.clone());
        }
        vars
    }
}

/// Output settings of the class (Java) target.
#[derive(Debug, Clone)]
pub struct JavaTarget {
    /// Output root; wiped at the start of each run.
    pub root: PathBuf,
    /// Build descriptor template (`pom.xml`).
    pub descriptor: Value,
    /// Default arguments for annotations written without any.
    pub annotation_defaults: HashMap<String, AnnotationArgs>,
}

impl JavaTarget {
    pub fn new(root: impl Into<PathBuf>, descriptor: Value) -> Self {
        Self {
            root: root.into(),
            descriptor,
            annotation_defaults: HashMap::new(),
        }
    }

    /// Load annotation defaults from a `Name -> "raw" | {named}` table.
    pub fn with_annotation_defaults(mut self, table: &Value) -> Result<Self, EmitError> {
        match table {
            Value::Null => {}
            Value::Object(map) => {
                for (name, value) in map {
                    let args = AnnotationArgs::from_value(value, name)
                        .map_err(|e| EmitError::settings("annotateDefaultVal", e.to_string()))?;
                    self.annotation_defaults.insert(name.clone(), args);
                }
            }
            _ => {
                return Err(EmitError::settings(
                    "annotateDefaultVal",
                    "must be a JSON object",
                ))
            }
        }
        Ok(self)
    }

    /// `<groupId>.<artifactId without '-'>.domain`, read from the
    /// descriptor's `project` element.
    pub fn base_package(&self, settings: &Settings) -> Result<String, EmitError> {
        let vars = settings.placeholders();
        let field = |key: &str| -> Result<String, EmitError> {
            self.descriptor
                .get("project")
                .and_then(|p| p.get(key))
                .and_then(Value::as_str)
                .map(|v| substitute_placeholder(v, &vars).to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    EmitError::settings(format!("maven.project.{key}"), "missing or not a string")
                })
        };

        let group = field("groupId")?;
        let artifact = field("artifactId")?.replace('-', "");
        Ok(format!("{group}.{artifact}.domain"))
    }

    /// Default arguments for an annotation, if any are configured.
    pub fn annotation_default(&self, name: &str) -> Option<&AnnotationArgs> {
        self.annotation_defaults.get(name)
    }
}

/// Output settings of a TypeScript target (model or schema).
#[derive(Debug, Clone)]
pub struct ScriptTarget {
    /// Output root; wiped at the start of each run.
    pub root: PathBuf,
    /// `package.json` template; `version` is overwritten.
    pub package: Value,
    /// `tsconfig.json` content.
    pub tsconfig: Value,
}

impl ScriptTarget {
    pub fn new(root: impl Into<PathBuf>, package: Value, tsconfig: Value) -> Self {
        Self {
            root: root.into(),
            package,
            tsconfig,
        }
    }

    /// The package manifest with `version` set to the library version.
    pub fn versioned_package(&self, settings: &Settings) -> Result<Value, EmitError> {
        let mut package = match &self.package {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => self.package.clone(),
            _ => return Err(EmitError::settings("package", "must be a JSON object")),
        };
        if let Value::Object(map) = &mut package {
            map.insert(
                "version".to_string(),
                Value::String(settings.lib_version.clone()),
            );
        }
        Ok(package)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Everything an emitter reads during a run.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub model: DomainModel,
    pub registries: TypeRegistries,
    pub settings: Settings,
}

impl GenerationContext {
    pub fn new(model: DomainModel, registries: TypeRegistries, settings: Settings) -> Self {
        Self {
            model,
            registries,
            settings,
        }
    }

    /// Query facade over the model and registries.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.model, &self.registries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholders_include_version() {
        let settings = Settings::new("2.0.0").with_variable("groupId", "com.acme");
        let vars = settings.placeholders();
        assert_eq!(vars["libVersion"], "2.0.0");
        assert_eq!(vars["lib_version"], "2.0.0");
        assert_eq!(vars["groupId"], "com.acme");
    }

    #[test]
    fn test_base_package_strips_dashes() {
        let target = JavaTarget::new(
            "out",
            json!({"project": {"groupId": "com.acme", "artifactId": "shop-core"}}),
        );
        assert_eq!(
            target.base_package(&Settings::default()).unwrap(),
            "com.acme.shopcore.domain"
        );
    }

    #[test]
    fn test_base_package_resolves_placeholders() {
        let target = JavaTarget::new(
            "out",
            json!({"project": {"groupId": "${group}", "artifactId": "lib"}}),
        );
        let settings = Settings::default().with_variable("group", "org.example");
        assert_eq!(
            target.base_package(&settings).unwrap(),
            "org.example.lib.domain"
        );
    }

    #[test]
    fn test_base_package_requires_coordinates() {
        let target = JavaTarget::new("out", json!({"project": {"groupId": "com.acme"}}));
        assert!(matches!(
            target.base_package(&Settings::default()),
            Err(EmitError::Settings { .. })
        ));
    }

    #[test]
    fn test_annotation_defaults() {
        let target = JavaTarget::new("out", json!({}))
            .with_annotation_defaults(&json!({
                "Table": {"name": "t"},
                "JsonInclude": "JsonInclude.Include.NON_NULL"
            }))
            .unwrap();
        assert!(matches!(
            target.annotation_default("Table"),
            Some(AnnotationArgs::Named(_))
        ));
        assert!(matches!(
            target.annotation_default("JsonInclude"),
            Some(AnnotationArgs::Raw(_))
        ));
        assert!(target.annotation_default("Data").is_none());
    }

    #[test]
    fn test_versioned_package() {
        let target = ScriptTarget::new("out", json!({"name": "lib", "version": "0.0.0"}), json!({}));
        let package = target.versioned_package(&Settings::new("3.1.4")).unwrap();
        assert_eq!(package["version"], "3.1.4");
        assert_eq!(package["name"], "lib");
    }
}
