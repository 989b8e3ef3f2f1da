//! Primitive type alias tables.
//!
//! Each target keeps its own [`TypeRegistry`]. An entry maps one target type
//! (`string`, `String`, `Schema.Types.ObjectId`, ...) to the set of domain
//! type names it satisfies, plus an optional dependency to import it from.
//! Lookups go from a domain type name to the entry; tables are small, so a
//! linear scan over the entries is used.

use serde_json::Value;

use crate::error::RegistryError;

/// One row of a registry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Type name as written in the target language.
    pub target: String,
    /// Domain type names resolved to `target`.
    pub aliases: Vec<String>,
    /// Import path (Java) or module specifier (TypeScript).
    pub dependency: Option<String>,
}

impl RegistryEntry {
    /// Entry aliasing the target name to itself.
    pub fn new(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            aliases: vec![target.clone()],
            target,
            dependency: None,
        }
    }

    /// Replace the alias set.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a dependency.
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }

    fn matches(&self, domain_type: &str) -> bool {
        self.aliases.iter().any(|a| a == domain_type)
    }
}

/// An ordered alias table for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    name: String,
    entries: Vec<RegistryEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Builder-style insert.
    pub fn with_entry(mut self, entry: RegistryEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Append an entry. Earlier entries win on alias overlap.
    pub fn insert(&mut self, entry: RegistryEntry) {
        self.entries.push(entry);
    }

    /// Load an alias table.
    ///
    /// Values may be one alias, a list of aliases, or an object with
    /// `aliases` and `dependency` keys. `null` aliases the key to itself.
    pub fn from_alias_table(name: impl Into<String>, table: &Value) -> Result<Self, RegistryError> {
        let mut registry = Self::new(name);

        for (target, value) in table_entries(&registry.name, table)? {
            let entry = match value {
                Value::Null => RegistryEntry::new(target.as_str()),
                Value::String(alias) => {
                    RegistryEntry::new(target.as_str()).with_aliases([alias.as_str()])
                }
                Value::Array(items) => RegistryEntry::new(target.as_str())
                    .with_aliases(registry.string_list(target, items)?),
                Value::Object(obj) => {
                    let mut entry = RegistryEntry::new(target.as_str());
                    match obj.get("aliases") {
                        None | Some(Value::Null) => {}
                        Some(Value::String(alias)) => entry = entry.with_aliases([alias.as_str()]),
                        Some(Value::Array(items)) => {
                            entry = entry.with_aliases(registry.string_list(target, items)?)
                        }
                        Some(_) => {
                            return Err(registry.invalid(target, "'aliases' must be a string or a list"))
                        }
                    }
                    match obj.get("dependency") {
                        None | Some(Value::Null) => {}
                        Some(Value::String(dep)) => entry = entry.with_dependency(dep.as_str()),
                        Some(_) => return Err(registry.invalid(target, "'dependency' must be a string")),
                    }
                    entry
                }
                _ => return Err(registry.invalid(target, "unsupported entry shape")),
            };
            registry.insert(entry);
        }
        Ok(registry)
    }

    /// Load a dependency table (`type -> import path`).
    ///
    /// Every key becomes an entry that aliases itself.
    pub fn from_dependency_table(
        name: impl Into<String>,
        table: &Value,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(name);

        for (target, value) in table_entries(&registry.name, table)? {
            let Value::String(dep) = value else {
                return Err(registry.invalid(target, "dependency must be a string"));
            };
            registry.insert(RegistryEntry::new(target.as_str()).with_dependency(dep.as_str()));
        }
        Ok(registry)
    }

    /// Attach dependencies from a `target -> module` table to existing
    /// entries. Targets without an entry are ignored.
    pub fn attach_dependencies(&mut self, table: &Value) -> Result<(), RegistryError> {
        for (target, value) in table_entries(&self.name, table)? {
            let Value::String(dep) = value else {
                return Err(self.invalid(target, "dependency must be a string"));
            };
            for entry in self.entries.iter_mut().filter(|e| &e.target == target) {
                entry.dependency = Some(dep.clone());
            }
        }
        Ok(())
    }

    /// Find the entry whose alias set contains `domain_type`.
    pub fn lookup(&self, domain_type: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.matches(domain_type))
    }

    /// Target type name for a domain type.
    pub fn target_for(&self, domain_type: &str) -> Option<&str> {
        self.lookup(domain_type).map(|e| e.target.as_str())
    }

    /// Dependency for a domain type.
    pub fn dependency_for(&self, domain_type: &str) -> Option<&str> {
        self.lookup(domain_type)
            .and_then(|e| e.dependency.as_deref())
    }

    pub fn contains(&self, domain_type: &str) -> bool {
        self.lookup(domain_type).is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn string_list(&self, key: &str, items: &[Value]) -> Result<Vec<String>, RegistryError> {
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(self.invalid(key, "aliases must be strings")),
            })
            .collect()
    }

    fn invalid(&self, key: &str, message: &str) -> RegistryError {
        RegistryError::invalid_entry(self.name.as_str(), key, message)
    }
}

/// Entries of a registry table; `null` reads as an empty table.
fn table_entries<'v>(
    table_name: &str,
    table: &'v Value,
) -> Result<impl Iterator<Item = (&'v String, &'v Value)>, RegistryError> {
    match table {
        Value::Null => Ok(None::<&'v serde_json::Map<String, Value>>.into_iter().flatten()),
        Value::Object(map) => Ok(Some(map).into_iter().flatten()),
        _ => Err(RegistryError::NotAnObject {
            table: table_name.to_string(),
        }),
    }
}

/// The three per-target registries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistries {
    /// Class target: types and `@Annotation` names with their imports.
    pub java: TypeRegistry,
    /// Model target: TypeScript types.
    pub model: TypeRegistry,
    /// Schema target: mongoose schema tokens.
    pub schema: TypeRegistry,
}

impl TypeRegistries {
    pub fn new(java: TypeRegistry, model: TypeRegistry, schema: TypeRegistry) -> Self {
        Self {
            java,
            model,
            schema,
        }
    }

    /// True when any of the three tables knows the type.
    pub fn contains(&self, domain_type: &str) -> bool {
        self.java.contains(domain_type)
            || self.model.contains(domain_type)
            || self.schema.contains(domain_type)
    }
}
