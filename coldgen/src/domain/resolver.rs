//! Domain model queries shared by every emitter.
//!
//! The resolver answers class lookups, inheritance flattening and generic
//! parameter substitution over an immutable [`DomainModel`]. Type names that
//! are not classes fall through to the [`TypeRegistries`].

use std::collections::HashSet;

use super::document::{AttributeDef, ClassDef, Container, EnumConstant, TypeParam};
use super::model::{ClassEntry, DomainModel};
use crate::error::DomainError;
use crate::registry::TypeRegistries;

/// An attribute as seen from a (possibly derived) class.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute<'a> {
    /// The declaration as written in the document.
    pub def: &'a AttributeDef,
    /// The class that declares the attribute.
    pub declared_in: &'a ClassDef,
    /// The class whose `extends` supplied the type arguments, if any.
    pub bound_by: Option<&'a ClassDef>,
    /// Attribute type after substitution.
    pub ty: String,
    /// Type argument names after substitution.
    pub args: Vec<String>,
}

impl<'a> ResolvedAttribute<'a> {
    pub fn name(&self) -> &'a str {
        &self.def.name
    }

    pub fn container(&self) -> Option<Container> {
        Container::from_type(&self.ty)
    }

    /// Element type of a `Set`/`List` attribute.
    pub fn element_type(&self) -> Option<&str> {
        self.container()
            .and_then(|_| self.args.first())
            .map(String::as_str)
    }

    /// True when the attribute was inherited rather than declared by `class`.
    pub fn is_inherited_by(&self, class: &str) -> bool {
        self.declared_in.name != class
    }
}

/// One step of an inheritance chain: the class and the type arguments its
/// child bound to it.
#[derive(Debug, Clone, Copy)]
pub struct Ancestor<'a> {
    pub entry: &'a ClassEntry,
    pub binding: &'a [TypeParam],
    /// The child that bound `binding`; `None` for the starting class.
    pub child: Option<&'a ClassDef>,
}

/// Read-only query facade over the domain model and registries.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    model: &'a DomainModel,
    registries: &'a TypeRegistries,
}

impl<'a> Resolver<'a> {
    pub fn new(model: &'a DomainModel, registries: &'a TypeRegistries) -> Self {
        Self { model, registries }
    }

    pub fn model(&self) -> &'a DomainModel {
        self.model
    }

    pub fn registries(&self) -> &'a TypeRegistries {
        self.registries
    }

    /// Find a class by name.
    pub fn resolve_class(&self, name: &str) -> Result<&'a ClassEntry, DomainError> {
        self.model
            .get(name)
            .ok_or_else(|| DomainError::class_not_found(name))
    }

    /// Find a class by name without failing.
    pub fn find_class(&self, name: &str) -> Option<&'a ClassEntry> {
        self.model.get(name)
    }

    /// Number of class nodes in the document.
    pub fn class_count(&self) -> usize {
        self.model.class_count()
    }

    /// Classes in document order.
    pub fn classes(&self) -> impl Iterator<Item = &'a ClassEntry> + 'a {
        self.model.classes()
    }

    /// Direct parent of a class, `None` for a root class.
    pub fn parent_of(&self, name: &str) -> Result<Option<&'a ClassEntry>, DomainError> {
        let entry = self.resolve_class(name)?;
        entry
            .def
            .parent()
            .map(|p| self.resolve_class(p.name))
            .transpose()
    }

    /// Namespace segments leading to the class.
    pub fn qualified_package_of(&self, name: &str) -> Result<&'a [String], DomainError> {
        self.resolve_class(name).map(|e| e.namespace.as_slice())
    }

    /// True iff the class exists and is declared `ENUM`.
    pub fn is_enum(&self, name: &str) -> bool {
        self.find_class(name).is_some_and(|e| e.def.is_enum())
    }

    /// Constants of an enum class.
    pub fn enum_constants(&self, name: &str) -> Result<&'a [EnumConstant], DomainError> {
        let entry = self.resolve_class(name)?;
        if !entry.def.is_enum() {
            return Err(DomainError::NotAnEnum {
                name: name.to_string(),
            });
        }
        Ok(&entry.def.constants)
    }

    /// True iff the name is a class or appears in any registry.
    pub fn is_known_type(&self, name: &str) -> bool {
        self.model.get(name).is_some() || self.registries.contains(name)
    }

    /// The class followed by its ancestors, nearest first.
    ///
    /// Fails when a parent is missing or the chain loops.
    pub fn ancestry(&self, name: &str) -> Result<Vec<Ancestor<'a>>, DomainError> {
        let mut current = self.resolve_class(name)?;
        let mut chain = vec![Ancestor {
            entry: current,
            binding: &[],
            child: None,
        }];

        while let Some(parent) = current.def.parent() {
            if chain.iter().any(|a| a.entry.name() == parent.name) {
                let mut names: Vec<String> =
                    chain.iter().map(|a| a.entry.name().to_string()).collect();
                names.push(parent.name.to_string());
                return Err(DomainError::CyclicInheritance { chain: names });
            }
            let child = &current.def;
            current = self.resolve_class(parent.name)?;
            chain.push(Ancestor {
                entry: current,
                binding: parent.args,
                child: Some(child),
            });
        }
        Ok(chain)
    }

    /// Own attributes followed by every inherited one.
    ///
    /// The most derived declaration of a name wins. Attributes of each
    /// ancestor are substituted with the type arguments bound by its direct
    /// child's `extends`; bindings are not chained further, so an argument
    /// naming one of the child's own parameters stays unbound (see
    /// [`Resolver::is_unbound_param`]).
    pub fn merged_attributes(&self, name: &str) -> Result<Vec<ResolvedAttribute<'a>>, DomainError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut merged = Vec::new();

        for ancestor in self.ancestry(name)? {
            for attr in &ancestor.entry.def.attributes {
                if seen.insert(attr.name.as_str()) {
                    let mut resolved =
                        self.substitute(attr, &ancestor.entry.def, ancestor.binding);
                    resolved.bound_by = ancestor.child;
                    merged.push(resolved);
                }
            }
        }
        Ok(merged)
    }

    /// Replace generic parameters of `declaring` with the bound arguments.
    ///
    /// A name is treated as a parameter only when the declaring class lists
    /// it and it is not a known type. Parameters without a positional
    /// argument in `binding` are kept as they are.
    pub fn substitute(
        &self,
        attr: &'a AttributeDef,
        declaring: &'a ClassDef,
        binding: &[TypeParam],
    ) -> ResolvedAttribute<'a> {
        let map = |name: &str| -> String {
            match declaring.injection.position(name) {
                Some(i) if !self.is_known_type(name) => binding
                    .get(i)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| name.to_string()),
                _ => name.to_string(),
            }
        };

        ResolvedAttribute {
            def: attr,
            declared_in: declaring,
            bound_by: None,
            ty: map(&attr.ty),
            args: attr.injection.names().map(map).collect(),
        }
    }

    /// True when `name` is still a generic parameter after substitution:
    /// either one the declaring class left unbound, or one of the binding
    /// child's own parameters passed up the chain.
    pub fn is_unbound_param(&self, attr: &ResolvedAttribute<'_>, name: &str) -> bool {
        if self.is_known_type(name) {
            return false;
        }
        attr.declared_in.declares_param(name)
            || attr.bound_by.is_some_and(|c| c.declares_param(name))
    }

    /// True when the class, or any ancestor, implements `marker`.
    pub fn implements_marker(&self, name: &str, marker: &str) -> Result<bool, DomainError> {
        Ok(self
            .ancestry(name)?
            .iter()
            .any(|a| a.entry.def.implements.iter().any(|i| i == marker)))
    }

    /// Check the references a declaration needs for its own identity: the
    /// parent chain and the bounds of its generic parameters.
    pub fn check_declaration(&self, entry: &ClassEntry) -> Result<(), DomainError> {
        self.ancestry(entry.name())?;
        for bound in entry.def.injection.params.iter().filter_map(|p| p.bound.as_deref()) {
            if !self.is_known_type(bound) {
                return Err(DomainError::UnresolvedReference {
                    class: entry.name().to_string(),
                    reference: bound.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of generic parameters declared by a class, 0 when unknown.
    pub fn generic_arity(&self, name: &str) -> usize {
        self.find_class(name).map_or(0, |e| e.def.injection.len())
    }
}
