//! Java class emitter.
//!
//! Produces `pom.xml` from the descriptor template and one builder-style
//! class (or enum) per domain class under `src/main/java/<package path>`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{log_import_miss, Emitter, RenderedFile};
use crate::domain::{
    Annotation, AnnotationArgs, AttributeDef, ClassDef, ClassEntry, ClassKind, Container,
    DefaultValue, InjectionSpec, Resolver, TypeParam,
};
use crate::error::CoreResult;
use crate::render::{
    comment_block, generic_list, lower_first, optional_comment_block, render_descriptor,
    upper_first, SourceBuilder,
};
use crate::settings::{GenerationContext, JavaTarget};

/// Marker interface that triggers a `serialVersionUID` field.
pub const SERIALIZABLE: &str = "Serializable";

/// Default sentinel rendered as the current timestamp.
pub const NOW_SENTINEL: &str = "LOCAL_DATE_TIME_NOW";

const ID: &str = "java";

/// Emitter for the Java class library.
#[derive(Debug, Clone)]
pub struct ClassEmitter {
    target: JavaTarget,
}

impl ClassEmitter {
    pub fn new(target: JavaTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &JavaTarget {
        &self.target
    }

    /// Java package of a class: the base package plus its namespace.
    pub fn package_of(base: &str, entry: &ClassEntry) -> String {
        if entry.namespace.is_empty() {
            base.to_string()
        } else {
            format!("{base}.{}", entry.dotted_namespace())
        }
    }

    /// File path of a class, relative to the output root.
    pub fn class_path(&self, base: &str, entry: &ClassEntry) -> PathBuf {
        let mut path = PathBuf::from("src/main/java");
        for segment in Self::package_of(base, entry).split('.') {
            path.push(segment);
        }
        path.push(format!("{}.{}", entry.name(), self.file_extension()));
        path
    }
}

impl Emitter for ClassEmitter {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "Java class library"
    }

    fn file_extension(&self) -> &'static str {
        "java"
    }

    fn output_root(&self) -> &Path {
        &self.target.root
    }

    fn project_files(&self, ctx: &GenerationContext) -> CoreResult<Vec<RenderedFile>> {
        let pom = render_descriptor(
            &self.target.descriptor,
            &ctx.settings.placeholders(),
            ctx.settings.indent,
        )?;
        Ok(vec![RenderedFile::new("pom.xml", pom)])
    }

    fn render_class(
        &self,
        entry: &ClassEntry,
        ctx: &GenerationContext,
    ) -> CoreResult<Option<RenderedFile>> {
        let resolver = ctx.resolver();
        resolver.check_declaration(entry)?;

        let base = self.target.base_package(&ctx.settings)?;
        let renderer = ClassRenderer {
            entry,
            def: &entry.def,
            resolver,
            target: &self.target,
            base: &base,
            package: Self::package_of(&base, entry),
            indent: ctx.settings.indent,
            width: ctx.settings.comment_width,
        };
        let content = renderer.render()?;
        Ok(Some(RenderedFile::new(self.class_path(&base, entry), content)))
    }
}

struct ClassRenderer<'a> {
    entry: &'a ClassEntry,
    def: &'a ClassDef,
    resolver: Resolver<'a>,
    target: &'a JavaTarget,
    base: &'a str,
    package: String,
    indent: usize,
    width: usize,
}

impl ClassRenderer<'_> {
    fn render(&self) -> CoreResult<String> {
        let mut src = SourceBuilder::new(self.indent);

        src.line(format!("package {};", self.package)).blank();

        let imports = self.imports();
        if !imports.is_empty() {
            src.lines(0, imports.iter().map(|i| format!("import {i};")));
            src.blank();
        }

        let desc = optional_comment_block(self.def.desc.as_ref(), self.width);
        if !desc.is_empty() {
            src.lines(0, desc).blank();
        }

        src.lines(
            0,
            self.def
                .annotations
                .iter()
                .map(|a| self.annotation(a, true)),
        );
        src.line(format!("{} {{", self.declaration())).blank();

        if self.def.is_enum() {
            self.enum_body(&mut src);
        } else {
            if self
                .resolver
                .implements_marker(self.entry.name(), SERIALIZABLE)?
            {
                src.at(1, "private static final long serialVersionUID = 1L;")
                    .blank();
            }
            for attr in &self.def.attributes {
                self.field(&mut src, attr);
            }
            for attr in self.def.attributes.iter().filter(|a| !a.is_const) {
                self.methods(&mut src, attr);
            }
        }

        src.line("}");
        Ok(src.finish())
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// Fully qualified imports, sorted and without same-package entries.
    fn imports(&self) -> BTreeSet<String> {
        let mut types: Vec<&str> = Vec::new();
        let mut annotations: Vec<&str> = Vec::new();

        annotations.extend(self.def.annotations.iter().map(|a| a.name.as_str()));

        for attr in &self.def.attributes {
            types.push(&attr.ty);
            if let Some(container) = attr.container() {
                types.push(container.implementation());
            }
            push_params(&mut types, &attr.injection);
            annotations.extend(attr.annotations.iter().map(|a| a.name.as_str()));
        }

        if let Some(parent) = self.def.parent() {
            types.push(parent.name);
            for arg in parent.args {
                types.push(&arg.name);
                types.extend(arg.bound.as_deref());
            }
        }
        types.extend(self.def.implements.iter().map(String::as_str));
        types.extend(
            self.def
                .injection
                .params
                .iter()
                .filter_map(|p| p.bound.as_deref()),
        );
        types.extend(self.def.dependencies.iter().map(String::as_str));

        let mut imports = BTreeSet::new();
        for ty in types {
            if self.def.declares_param(ty) {
                continue;
            }
            match self.type_dependency(ty) {
                Some(dep) => {
                    imports.insert(dep);
                }
                None => log_import_miss(ID, self.entry.name(), ty),
            }
        }
        for name in annotations {
            match self
                .resolver
                .registries()
                .java
                .dependency_for(&format!("@{name}"))
            {
                Some(dep) => {
                    imports.insert(dep.to_string());
                }
                None => log_import_miss(ID, self.entry.name(), name),
            }
        }

        imports.retain(|dep| import_package(dep) != self.package);
        imports
    }

    /// Java registry dependency first, then the qualified domain class.
    fn type_dependency(&self, ty: &str) -> Option<String> {
        if let Some(dep) = self.resolver.registries().java.dependency_for(ty) {
            return Some(dep.to_string());
        }
        self.resolver.find_class(ty).map(|entry| {
            format!(
                "{}.{}",
                ClassEmitter::package_of(self.base, entry),
                entry.name()
            )
        })
    }

    // =========================================================================
    // Declaration
    // =========================================================================

    fn declaration(&self) -> String {
        let keyword = match self.def.kind {
            ClassKind::Class => "class",
            ClassKind::Abstract => "abstract class",
            ClassKind::Enum => "enum",
        };

        let mut decl = format!(
            "public {keyword} {}{}",
            self.def.name,
            generic_list(self.def.injection.params.iter().map(param_decl))
        );

        if let Some(parent) = self.def.parent() {
            decl.push_str(&format!(
                " extends {}{}",
                parent.name,
                generic_list(parent.args.iter().map(param_decl))
            ));
        }
        if !self.def.implements.is_empty() {
            decl.push_str(&format!(" implements {}", self.def.implements.join(", ")));
        }
        decl
    }

    /// `@Name(args)`; class-level annotations without arguments fall back to
    /// the configured defaults.
    fn annotation(&self, annotation: &Annotation, use_defaults: bool) -> String {
        let args = match (&annotation.args, use_defaults) {
            (AnnotationArgs::None, true) => self.target.annotation_default(&annotation.name),
            (args, _) => Some(args),
        };
        format!(
            "@{}{}",
            annotation.name,
            args.map(annotation_args).unwrap_or_default()
        )
    }

    // =========================================================================
    // Body
    // =========================================================================

    fn enum_body(&self, src: &mut SourceBuilder) {
        let count = self.def.constants.len();
        for (i, constant) in self.def.constants.iter().enumerate() {
            if let Some(desc) = &constant.desc {
                src.lines(1, comment_block(desc, self.width));
            }
            let sep = if i + 1 == count { ';' } else { ',' };
            src.at(1, format!("{}{sep}", constant.name));
        }
        if count > 0 {
            src.blank();
        }
    }

    fn field(&self, src: &mut SourceBuilder, attr: &AttributeDef) {
        src.lines(1, optional_comment_block(attr.desc.as_ref(), self.width));
        src.lines(1, attr.annotations.iter().map(|a| self.annotation(a, false)));

        let mut decl = String::from(if attr.is_public { "public " } else { "private " });
        if attr.is_static {
            decl.push_str("static ");
        }
        if attr.is_const {
            decl.push_str("final ");
        }
        decl.push_str(&attr_type(attr));
        decl.push(' ');
        decl.push_str(&attr.name);

        match &attr.default {
            Some(DefaultValue::Text(text)) if text == NOW_SENTINEL => {
                decl.push_str(" = LocalDateTime.now()")
            }
            Some(value) => decl.push_str(&format!(" = {value}")),
            None => {}
        }
        decl.push(';');

        src.at(1, decl).blank();
    }

    fn methods(&self, src: &mut SourceBuilder, attr: &AttributeDef) {
        let returns = format!(
            "{}{}",
            self.def.name,
            generic_list(self.def.injection.names())
        );
        let name = &attr.name;

        src.at(1, format!("public {returns} {name}({} {name}) {{", attr_type(attr)))
            .at(2, format!("this.{name} = {name};"))
            .at(2, "return this;")
            .at(1, "}")
            .blank();

        let Some(container) = attr.container() else {
            return;
        };
        let element = attr.element_type().unwrap_or("Object");
        let param = lower_first(element);
        let cap = upper_first(name);

        self.init_method(src, &returns, attr, container);
        for op in ["add", "remove"] {
            src.at(1, format!("public {returns} {op}{cap}({element} {param}) {{"))
                .at(2, format!("init{cap}();"))
                .at(2, format!("this.{name}.{op}({param});"))
                .at(2, "return this;")
                .at(1, "}")
                .blank();
        }
    }

    fn init_method(
        &self,
        src: &mut SourceBuilder,
        returns: &str,
        attr: &AttributeDef,
        container: Container,
    ) {
        let name = &attr.name;
        src.at(1, format!("public {returns} init{}() {{", upper_first(name)))
            .at(2, format!("if( this.{name} == null ){{"))
            .at(3, format!("this.{name} = new {}<>();", container.implementation()))
            .at(2, "}")
            .at(2, "return this;")
            .at(1, "}")
            .blank();
    }
}

fn push_params<'a>(types: &mut Vec<&'a str>, injection: &'a InjectionSpec) {
    for param in &injection.params {
        types.push(&param.name);
        types.extend(param.bound.as_deref());
    }
}

/// `T` or `T extends Bound`.
fn param_decl(param: &TypeParam) -> String {
    match &param.bound {
        Some(bound) => format!("{} extends {bound}", param.name),
        None => param.name.clone(),
    }
}

/// Declared type of an attribute with its type arguments.
fn attr_type(attr: &AttributeDef) -> String {
    format!(
        "{}{}",
        attr.ty,
        generic_list(attr.injection.params.iter().map(param_decl))
    )
}

/// Package of a fully qualified name: the segments before the first one
/// starting with an uppercase letter.
fn import_package(qualified: &str) -> String {
    qualified
        .split('.')
        .take_while(|s| !s.starts_with(|c: char| c.is_ascii_uppercase()))
        .collect::<Vec<_>>()
        .join(".")
}

/// `(raw)`, `(k = "v", n = 1)` or nothing.
fn annotation_args(args: &AnnotationArgs) -> String {
    match args {
        AnnotationArgs::None => String::new(),
        AnnotationArgs::Raw(raw) => format!("({raw})"),
        AnnotationArgs::Named(pairs) => {
            let rendered: Vec<String> = pairs
                .iter()
                .filter_map(|(key, value)| {
                    let value = match value {
                        Value::Null => return None,
                        Value::String(s) if s.ends_with(".class") => s.clone(),
                        Value::String(s) => format!("\"{s}\""),
                        other => other.to_string(),
                    };
                    Some(format!("{key} = {value}"))
                })
                .collect();
            if rendered.is_empty() {
                String::new()
            } else {
                format!("({})", rendered.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainModel;
    use crate::registry::{RegistryEntry, TypeRegistries, TypeRegistry};
    use crate::settings::Settings;
    use serde_json::json;

    fn context(domain: Value) -> GenerationContext {
        let java = TypeRegistry::from_dependency_table(
            "java",
            &json!({
                "LocalDateTime": "java.time.LocalDateTime",
                "Set": "java.util.Set",
                "HashSet": "java.util.HashSet",
                "List": "java.util.List",
                "ArrayList": "java.util.ArrayList",
                "@Data": "lombok.Data",
                "@JsonSerialize": "com.fasterxml.jackson.databind.annotation.JsonSerialize"
            }),
        )
        .unwrap()
        .with_entry(RegistryEntry::new("String"));
        GenerationContext::new(
            DomainModel::from_value(&domain).unwrap(),
            TypeRegistries::new(java, TypeRegistry::new("model"), TypeRegistry::new("schema")),
            Settings::default(),
        )
    }

    fn emitter() -> ClassEmitter {
        ClassEmitter::new(
            JavaTarget::new(
                "out/java",
                json!({"project": {"groupId": "com.acme", "artifactId": "shop-lib"}}),
            )
            .with_annotation_defaults(&json!({"Table": "name = \"t\""}))
            .unwrap(),
        )
    }

    fn render(ctx: &GenerationContext, name: &str) -> RenderedFile {
        let entry = ctx.model.get(name).unwrap();
        emitter().render_class(entry, ctx).unwrap().unwrap()
    }

    #[test]
    fn test_animal_scenario() {
        let ctx = context(json!({"Animal": {"type": "obj", "attributes": {"name": {"type": "String"}}}}));
        let file = render(&ctx, "Animal");

        assert_eq!(
            file.path,
            PathBuf::from("src/main/java/com/acme/shoplib/domain/Animal.java")
        );
        insta::assert_snapshot!(file.content, @r###"
package com.acme.shoplib.domain;

public class Animal {

    private String name;

    public Animal name(String name) {
        this.name = name;
        return this;
    }

}
"###);
    }

    #[test]
    fn test_set_attribute_methods_and_imports() {
        let ctx = context(json!({
            "shop": {
                "Order": {
                    "type": "obj",
                    "attributes": {
                        "tags": {"type": "Set", "injection": "Tag"},
                        "createdAt": {"type": "LocalDateTime", "default": "LOCAL_DATE_TIME_NOW"}
                    }
                },
                "Tag": {"type": "obj"}
            }
        }));
        let content = render(&ctx, "Order").content;

        assert!(content.contains("import java.time.LocalDateTime;\nimport java.util.HashSet;\nimport java.util.Set;\n"));
        assert!(!content.contains("import com.acme.shoplib.domain.shop.Tag;"));
        assert!(content.contains("    private Set<Tag> tags;\n"));
        assert!(content.contains("    private LocalDateTime createdAt = LocalDateTime.now();\n"));
        assert!(content.contains("    public Order initTags() {\n        if( this.tags == null ){\n            this.tags = new HashSet<>();\n        }\n        return this;\n    }\n"));
        assert!(content.contains("    public Order addTags(Tag tag) {\n        initTags();\n        this.tags.add(tag);\n        return this;\n    }\n"));
        assert!(content.contains("    public Order removeTags(Tag tag) {\n        initTags();\n        this.tags.remove(tag);\n"));
    }

    #[test]
    fn test_cross_package_import_and_generic_declaration() {
        let ctx = context(json!({
            "base": {
                "Entity": {
                    "type": "obj",
                    "properties": {"classType": "ABSTRACT_CLASS", "implements": "Serializable"}
                },
                "Page": {
                    "type": "obj",
                    "properties": {"injection": {"T": {"extends": "Entity"}}, "extends": "Entity"},
                    "attributes": {"items": {"type": "List", "injection": "T"}}
                }
            },
            "shop": {
                "Order": {"type": "obj", "properties": {"extends": "Entity"}},
                "OrderPage": {"type": "obj", "properties": {"extends": {"Page": {"injection": "Order"}}}}
            }
        }));

        let page = render(&ctx, "Page").content;
        assert!(page.contains("public class Page<T extends Entity> extends Entity {\n"));
        assert!(page.contains("    private static final long serialVersionUID = 1L;\n"));
        assert!(page.contains("    public Page<T> items(List<T> items) {\n"));
        assert!(page.contains("    public Page<T> addItems(T t) {\n"));

        let order_page = render(&ctx, "OrderPage").content;
        assert!(order_page.contains("import com.acme.shoplib.domain.base.Page;\n"));
        assert!(!order_page.contains("import com.acme.shoplib.domain.shop.Order;"));
        assert!(order_page.contains("public class OrderPage extends Page<Order> {\n"));
        assert!(order_page.contains("serialVersionUID"));
    }

    #[test]
    fn test_annotations_and_descriptions() {
        let ctx = context(json!({
            "Account": {
                "type": "obj",
                "properties": {
                    "desc": "A customer account",
                    "annotate": ["Data", "Table", {"JsonSerialize": {"using": "ToStringSerializer.class", "as": null}}]
                },
                "attributes": {
                    "code": {
                        "type": "String",
                        "desc": ["Public code", "never reused"],
                        "annotate": {"Column": {"name": "code", "length": 12}},
                        "isPublic": true,
                        "isStatic": true,
                        "isConst": true,
                        "default": "\"A\""
                    }
                }
            }
        }));
        let content = render(&ctx, "Account").content;

        assert!(content.contains("import com.fasterxml.jackson.databind.annotation.JsonSerialize;\nimport lombok.Data;\n\n/** A customer account */\n\n@Data\n@Table(name = \"t\")\n@JsonSerialize(using = ToStringSerializer.class)\npublic class Account {\n"));
        assert!(content.contains("    /**\n     * Public code\n     * never reused\n     */\n    @Column(name = \"code\", length = 12)\n    public static final String code = \"A\";\n"));
        assert!(!content.contains("public Account code("));
    }

    #[test]
    fn test_enum_constants() {
        let ctx = context(json!({
            "Status": {
                "type": "obj",
                "properties": {"classType": "ENUM"},
                "attributes": {"OPEN": {"desc": "still open"}, "CLOSED": null}
            }
        }));
        let content = render(&ctx, "Status").content;

        insta::assert_snapshot!(content, @r###"
package com.acme.shoplib.domain;

public enum Status {

    /** still open */
    OPEN,
    CLOSED;

}
"###);
    }

    #[test]
    fn test_pom_is_rendered() {
        let ctx = context(json!({}));
        let files = emitter().project_files(&ctx).unwrap();
        assert_eq!(files[0].path, PathBuf::from("pom.xml"));
        assert!(files[0].content.contains("<artifactId>shop-lib</artifactId>"));
    }

    #[test]
    fn test_import_package() {
        assert_eq!(import_package("java.util.Set"), "java.util");
        assert_eq!(import_package("com.acme.domain.Outer.Inner"), "com.acme.domain");
    }
}
