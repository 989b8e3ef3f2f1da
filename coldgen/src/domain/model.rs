//! Flattened, indexed view of the domain document.
//!
//! The tree is walked exactly once, depth first, in document order. Every
//! `"type": "obj"` node becomes a [`ClassEntry`] that remembers the package
//! keys leading to it. Class names must be unique across the whole tree.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::document::ClassDef;
use crate::error::DomainError;

/// Node `type` value marking a class.
pub const CLASS_NODE_TYPE: &str = "obj";

/// A class together with its namespace path.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    pub def: ClassDef,
    /// Package keys from the document root down to the class.
    pub namespace: Vec<String>,
}

impl ClassEntry {
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Dotted namespace, empty for classes at the root.
    pub fn dotted_namespace(&self) -> String {
        self.namespace.join(".")
    }

    /// `ns/sub/Name`, used for progress labels.
    pub fn label(&self) -> String {
        self.namespace
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.def.name.as_str()))
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// The parsed domain document.
#[derive(Debug, Clone, Default)]
pub struct DomainModel {
    classes: Vec<ClassEntry>,
    index: HashMap<String, usize>,
    packages: usize,
}

impl DomainModel {
    /// Parse a domain document from JSON text.
    pub fn from_json_str(source: &str) -> Result<Self, DomainError> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| DomainError::invalid_node("<root>", e.to_string()))?;
        Self::from_value(&value)
    }

    /// Flatten an already parsed domain document.
    pub fn from_value(root: &Value) -> Result<Self, DomainError> {
        let Value::Object(map) = root else {
            return Err(DomainError::invalid_node(
                "<root>",
                "the domain document must be a JSON object",
            ));
        };

        let mut model = Self::default();
        let mut namespace = Vec::new();
        model.walk(map, &mut namespace)?;
        debug!(
            classes = model.classes.len(),
            packages = model.packages,
            "domain model indexed"
        );
        Ok(model)
    }

    fn walk(
        &mut self,
        map: &serde_json::Map<String, Value>,
        namespace: &mut Vec<String>,
    ) -> Result<(), DomainError> {
        for (key, value) in map {
            let path = namespace
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(key.as_str()))
                .collect::<Vec<_>>()
                .join(".");

            let Value::Object(node) = value else {
                return Err(DomainError::invalid_node(
                    path,
                    "expected a package or class object",
                ));
            };

            match node.get("type") {
                None | Some(Value::Null) => {
                    self.packages += 1;
                    namespace.push(key.clone());
                    self.walk(node, namespace)?;
                    namespace.pop();
                }
                Some(Value::String(ty)) if ty == CLASS_NODE_TYPE => {
                    let def = ClassDef::from_value(key, value, &path)?;
                    self.insert(ClassEntry {
                        def,
                        namespace: namespace.clone(),
                    })?;
                }
                Some(other) => {
                    debug!(node = %path, node_type = %other, "skipping non-class node");
                }
            }
        }
        Ok(())
    }

    fn insert(&mut self, entry: ClassEntry) -> Result<(), DomainError> {
        if let Some(&existing) = self.index.get(entry.name()) {
            return Err(DomainError::DuplicateClass {
                name: entry.name().to_string(),
                first: self.classes[existing].label(),
                second: entry.label(),
            });
        }
        self.index.insert(entry.name().to_string(), self.classes.len());
        self.classes.push(entry);
        Ok(())
    }

    /// Look up a class by name.
    pub fn get(&self, name: &str) -> Option<&ClassEntry> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    /// Classes in depth-first document order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    /// Number of `"type": "obj"` nodes in the tree.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of enum classes.
    pub fn enum_count(&self) -> usize {
        self.classes.iter().filter(|c| c.def.is_enum()).count()
    }

    /// Number of package nodes.
    pub fn package_count(&self) -> usize {
        self.packages
    }
}
