//! The domain document, its flattened index and the resolver over both.

pub mod document;
pub mod model;
pub mod resolver;

pub use document::{
    Annotation, AnnotationArgs, AttributeDef, ClassDef, ClassKind, Container, DefaultValue,
    Description, EnumConstant, ExtendsSpec, InjectionSpec, ParentRef, TypeParam,
};
pub use model::{ClassEntry, DomainModel};
pub use resolver::{Ancestor, ResolvedAttribute, Resolver};
