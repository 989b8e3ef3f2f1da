//! TypeScript model emitter.
//!
//! Every class becomes an `I<Name>` interface plus an implementing class
//! with an all-optional constructor; every enum becomes a `const enum` and a
//! companion lookup object.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::{log_import_miss, other_class, script_module_path, Emitter, RenderedFile};
use crate::domain::{ClassDef, ClassEntry, Container, ResolvedAttribute, Resolver};
use crate::error::CoreResult;
use crate::render::{comment_block, generic_list, optional_comment_block, pretty_json, SourceBuilder};
use crate::settings::{GenerationContext, ScriptTarget};

const ID: &str = "model";

/// Emitter for the TypeScript model library.
#[derive(Debug, Clone)]
pub struct ModelEmitter {
    target: ScriptTarget,
}

impl ModelEmitter {
    pub fn new(target: ScriptTarget) -> Self {
        Self { target }
    }
}

impl Emitter for ModelEmitter {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "TypeScript model library"
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn output_root(&self) -> &Path {
        self.target.root()
    }

    fn project_files(&self, ctx: &GenerationContext) -> CoreResult<Vec<RenderedFile>> {
        project_files(&self.target, ctx)
    }

    fn render_class(
        &self,
        entry: &ClassEntry,
        ctx: &GenerationContext,
    ) -> CoreResult<Option<RenderedFile>> {
        let resolver = ctx.resolver();
        resolver.check_declaration(entry)?;

        let renderer = ModelRenderer {
            entry,
            def: &entry.def,
            resolver,
            indent: ctx.settings.indent,
            width: ctx.settings.comment_width,
        };
        let content = if entry.def.is_enum() {
            renderer.render_enum()
        } else {
            renderer.render_class()?
        };

        let suffix = format!(".model.{}", self.file_extension());
        let path = PathBuf::from(script_module_path(entry, &suffix));
        Ok(Some(RenderedFile::new(path, content)))
    }
}

/// `package.json` and `tsconfig.json`, shared with the schema target.
pub(crate) fn project_files(
    target: &ScriptTarget,
    ctx: &GenerationContext,
) -> CoreResult<Vec<RenderedFile>> {
    let indent = ctx.settings.indent;
    let package = target.versioned_package(&ctx.settings)?;
    Ok(vec![
        RenderedFile::new("package.json", pretty_json("package.json", &package, indent)?),
        RenderedFile::new(
            "tsconfig.json",
            pretty_json("tsconfig.json", &target.tsconfig, indent)?,
        ),
    ])
}

/// Map a domain type and its arguments to a TypeScript type.
///
/// Registry targets win, then `I<Name>` for classes and `<Name>` for enums.
/// Anything else (a generic parameter) is kept as written. A generic class
/// referenced without arguments gets `any` for each parameter.
pub fn ts_type(resolver: &Resolver<'_>, ty: &str, args: &[String]) -> String {
    if Container::from_type(ty).is_some() {
        let element = args
            .first()
            .map_or_else(|| "any".to_string(), |e| ts_type(resolver, e, &[]));
        return format!("{element}[]");
    }

    let base = match resolver.registries().model.target_for(ty) {
        Some(target) => target.to_string(),
        None => match resolver.find_class(ty) {
            Some(entry) if entry.def.is_enum() => ty.to_string(),
            Some(_) => format!("I{ty}"),
            None => ty.to_string(),
        },
    };

    let generics = if !args.is_empty() {
        generic_list(args.iter().map(|a| ts_type(resolver, a, &[])))
    } else {
        generic_list(std::iter::repeat("any").take(resolver.generic_arity(ty)))
    };
    format!("{base}{generics}")
}

struct ModelRenderer<'a> {
    entry: &'a ClassEntry,
    def: &'a ClassDef,
    resolver: Resolver<'a>,
    indent: usize,
    width: usize,
}

impl ModelRenderer<'_> {
    fn render_class(&self) -> CoreResult<String> {
        let merged = self.resolver.merged_attributes(self.entry.name())?;
        let mut src = SourceBuilder::new(self.indent);

        let mut types: Vec<&str> = Vec::new();
        for attr in &merged {
            let names =
                std::iter::once(attr.ty.as_str()).chain(attr.args.iter().map(String::as_str));
            types.extend(names.filter(|n| !self.resolver.is_unbound_param(attr, n)));
        }
        if let Some(parent) = self.def.parent() {
            types.push(parent.name);
            types.extend(parent.args.iter().map(|a| a.name.as_str()));
        }
        let imports = self.imports(types);
        if !imports.is_empty() {
            src.lines(0, imports).blank();
        }

        src.lines(0, optional_comment_block(self.def.desc.as_ref(), self.width));

        let params = generic_list(self.def.injection.names());
        let extends = self
            .def
            .parent()
            .map(|p| {
                let args: Vec<String> = p.args.iter().map(|a| a.name.clone()).collect();
                format!(" extends {}", ts_type(&self.resolver, p.name, &args))
            })
            .unwrap_or_default();

        let name = &self.def.name;
        src.line(format!("export interface I{name}{params}{extends} {{"));
        for attr in &self.def.attributes {
            let args: Vec<String> = attr.injection.names().map(str::to_string).collect();
            src.lines(1, optional_comment_block(attr.desc.as_ref(), self.width));
            src.at(
                1,
                format!("{}?: {};", attr.name, ts_type(&self.resolver, &attr.ty, &args)),
            );
        }
        src.line("}").blank();

        src.line(format!("export class {name}{params} implements I{name}{params} {{"))
            .at(1, "constructor(");
        for attr in &merged {
            let args: Vec<String> = attr
                .args
                .iter()
                .map(|a| self.visible(attr, a).to_string())
                .collect();
            src.at(
                2,
                format!(
                    "public {}?: {},",
                    attr.name(),
                    ts_type(&self.resolver, self.visible(attr, &attr.ty), &args)
                ),
            );
        }
        src.at(1, "){}").line("}");

        Ok(src.finish())
    }

    /// `any` for a generic parameter that is unbound and was not introduced
    /// by this class itself.
    fn visible<'n>(&self, attr: &ResolvedAttribute<'_>, name: &'n str) -> &'n str {
        let introduced_here = std::ptr::eq(attr.declared_in, self.def)
            || attr.bound_by.is_some_and(|c| std::ptr::eq(c, self.def));
        if self.resolver.is_unbound_param(attr, name)
            && !(introduced_here && self.def.declares_param(name))
        {
            "any"
        } else {
            name
        }
    }

    fn render_enum(&self) -> String {
        let mut src = SourceBuilder::new(self.indent);
        let name = &self.def.name;

        src.lines(0, optional_comment_block(self.def.desc.as_ref(), self.width));
        src.line(format!("export const enum {name} {{"));
        for constant in &self.def.constants {
            if let Some(desc) = &constant.desc {
                src.lines(1, comment_block(desc, self.width));
            }
            src.at(1, format!("{0} = '{0}',", constant.name));
        }
        src.line("}").blank();

        src.line(format!("export const {name}Obj = {{"));
        for constant in &self.def.constants {
            src.at(1, format!("{0}: {name}.{0},", constant.name));
        }
        src.line("}");

        src.finish()
    }

    /// Sorted `import { X } from '...';` lines.
    fn imports<'t>(&self, types: impl IntoIterator<Item = &'t str>) -> BTreeSet<String> {
        let mut imports = BTreeSet::new();
        let registry = &self.resolver.registries().model;

        for ty in types {
            if Container::from_type(ty).is_some() || self.def.declares_param(ty) {
                continue;
            }
            if let Some(entry) = registry.lookup(ty) {
                if let Some(dep) = &entry.dependency {
                    imports.insert(format!("import {{ {} }} from '{dep}';", entry.target));
                }
                continue;
            }
            if ty == self.entry.name() {
                continue;
            }
            match other_class(&self.resolver, self.entry.name(), ty) {
                Some(class) => {
                    let symbol = if class.def.is_enum() {
                        class.name().to_string()
                    } else {
                        format!("I{}", class.name())
                    };
                    imports.insert(format!(
                        "import {{ {symbol} }} from '{}';",
                        script_module_path(class, ".model")
                    ));
                }
                None => log_import_miss(ID, self.entry.name(), ty),
            }
        }
        imports
    }
}
