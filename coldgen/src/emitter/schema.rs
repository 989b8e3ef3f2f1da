//! Mongoose schema emitter.
//!
//! One schema per concrete class, with inherited attributes flattened into
//! it. Enums are inlined as string enums and never get a file of their own;
//! abstract classes have no schema either.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{other_class, script_module_path, Emitter, RenderedFile};
use crate::domain::{ClassEntry, Container, ResolvedAttribute, Resolver};
use crate::error::CoreResult;
use crate::render::{optional_comment_block, SourceBuilder};
use crate::settings::{GenerationContext, ScriptTarget};

/// Schema token for values without a fixed shape.
pub const MIXED: &str = "Schema.Types.Mixed";

const ID: &str = "schema";

/// Emitter for the mongoose schema library.
#[derive(Debug, Clone)]
pub struct SchemaEmitter {
    target: ScriptTarget,
}

impl SchemaEmitter {
    pub fn new(target: ScriptTarget) -> Self {
        Self { target }
    }
}

impl Emitter for SchemaEmitter {
    fn id(&self) -> &'static str {
        ID
    }

    fn name(&self) -> &'static str {
        "mongoose schema library"
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn output_root(&self) -> &Path {
        self.target.root()
    }

    fn project_files(&self, ctx: &GenerationContext) -> CoreResult<Vec<RenderedFile>> {
        super::model::project_files(&self.target, ctx)
    }

    fn render_class(
        &self,
        entry: &ClassEntry,
        ctx: &GenerationContext,
    ) -> CoreResult<Option<RenderedFile>> {
        if entry.def.is_enum() || entry.def.is_abstract() {
            return Ok(None);
        }

        let resolver = ctx.resolver();
        resolver.check_declaration(entry)?;

        let mut imports = BTreeSet::new();
        let mut fields = SourceBuilder::new(ctx.settings.indent);
        for attr in resolver.merged_attributes(entry.name())? {
            let Some(token) = schema_token(&resolver, entry, &attr, &mut imports) else {
                warn!(
                    target_id = ID,
                    class = entry.name(),
                    attribute = attr.name(),
                    ty = %attr.ty,
                    "skipping attribute with unresolved type"
                );
                continue;
            };
            fields.lines(
                1,
                optional_comment_block(attr.def.desc.as_ref(), ctx.settings.comment_width),
            );
            fields.at(1, format!("{}: {token},", attr.name()));
        }

        let name = entry.name();
        let mut src = SourceBuilder::new(ctx.settings.indent);
        src.line("import { Schema } from \"mongoose\";");
        src.lines(0, imports).blank();
        let desc = optional_comment_block(entry.def.desc.as_ref(), ctx.settings.comment_width);
        src.lines(0, desc);
        src.line(format!("const {name}Schema = new Schema({{"));
        let mut content = src.finish();
        if !fields.is_empty() {
            content.push_str(&fields.finish());
        }

        let mut tail = SourceBuilder::new(ctx.settings.indent);
        tail.line("});")
            .blank()
            .line(format!("export {{ {name}Schema }};"));
        content.push_str(&tail.finish());

        let suffix = format!(".schema.{}", self.file_extension());
        let path = PathBuf::from(script_module_path(entry, &suffix));
        Ok(Some(RenderedFile::new(path, content)))
    }
}

/// Schema expression for an attribute, collecting the imports it needs.
///
/// `None` when the type resolves to nothing.
fn schema_token(
    resolver: &Resolver<'_>,
    current: &ClassEntry,
    attr: &ResolvedAttribute<'_>,
    imports: &mut BTreeSet<String>,
) -> Option<String> {
    if attr.container().is_some() {
        let element = attr.element_type()?;
        return type_token(resolver, current, attr, element, imports).map(|t| format!("[ {t} ]"));
    }
    type_token(resolver, current, attr, &attr.ty, imports)
}

fn type_token(
    resolver: &Resolver<'_>,
    current: &ClassEntry,
    attr: &ResolvedAttribute<'_>,
    ty: &str,
    imports: &mut BTreeSet<String>,
) -> Option<String> {
    if let Some(target) = resolver.registries().schema.target_for(ty) {
        return Some(target.to_string());
    }
    if Container::from_type(ty).is_some() || resolver.is_unbound_param(attr, ty) {
        return Some(MIXED.to_string());
    }

    let class = resolver.find_class(ty)?;
    if class.def.is_enum() {
        let values: Vec<String> = class
            .def
            .constants
            .iter()
            .map(|c| format!("'{}'", c.name))
            .collect();
        let values = if values.is_empty() {
            "[]".to_string()
        } else {
            format!("[ {} ]", values.join(", "))
        };
        return Some(format!("{{ type: String, enum: {values} }}"));
    }
    // A schema constant cannot refer to itself while being initialized.
    if class.def.is_abstract() || class.name() == current.name() {
        return Some(MIXED.to_string());
    }

    if let Some(other) = other_class(resolver, current.name(), ty) {
        imports.insert(format!(
            "import {{ {0}Schema }} from '{1}';",
            other.name(),
            script_module_path(other, ".schema")
        ));
    }
    Some(format!("{}Schema", class.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainModel;
    use crate::registry::{TypeRegistries, TypeRegistry};
    use crate::settings::Settings;
    use serde_json::{json, Value};

    fn context(domain: Value) -> GenerationContext {
        let schema = TypeRegistry::from_alias_table(
            "schema",
            &json!({
                "String": ["String", "Character"],
                "Number": ["Integer", "Long", "BigDecimal"],
                "Date": ["LocalDateTime"],
                "Schema.Types.ObjectId": ["ObjectId"]
            }),
        )
        .unwrap();
        GenerationContext::new(
            DomainModel::from_value(&domain).unwrap(),
            TypeRegistries::new(TypeRegistry::new("java"), TypeRegistry::new("model"), schema),
            Settings::default(),
        )
    }

    fn emitter() -> SchemaEmitter {
        SchemaEmitter::new(ScriptTarget::new("out/schema", json!({}), json!({})))
    }

    fn render(ctx: &GenerationContext, name: &str) -> Option<RenderedFile> {
        let entry = ctx.model.get(name).unwrap();
        emitter().render_class(entry, ctx).unwrap()
    }

    #[test]
    fn test_animal_scenario() {
        let ctx = context(json!({"Animal": {"type": "obj", "attributes": {"name": {"type": "String"}}}}));
        let file = render(&ctx, "Animal").unwrap();

        assert_eq!(file.path, PathBuf::from("src/domain/animal.schema.ts"));
        insta::assert_snapshot!(file.content, @r###"
import { Schema } from "mongoose";

const AnimalSchema = new Schema({
    name: String,
});

export { AnimalSchema };
"###);
    }

    #[test]
    fn test_flattened_schema_with_nested_types() {
        let ctx = context(json!({
            "base": {
                "Entity": {
                    "type": "obj",
                    "properties": {"classType": "ABSTRACT_CLASS"},
                    "attributes": {"id": {"type": "ObjectId"}}
                },
                "Page": {
                    "type": "obj",
                    "properties": {"injection": "T", "extends": "Entity"},
                    "attributes": {"current": {"type": "T"}}
                }
            },
            "shop": {
                "Tag": {"type": "obj", "attributes": {"label": {"type": "String"}}},
                "Status": {"type": "obj", "properties": {"classType": "ENUM"}, "attributes": ["OPEN", "CLOSED"]},
                "Order": {
                    "type": "obj",
                    "properties": {"extends": {"Page": {"injection": "Tag"}}, "desc": "An order"},
                    "attributes": {
                        "tags": {"type": "Set", "injection": "Tag", "desc": "labels"},
                        "status": {"type": "Status"},
                        "owner": {"type": "Entity"},
                        "ghost": {"type": "Phantom"}
                    }
                }
            }
        }));

        insta::assert_snapshot!(render(&ctx, "Order").unwrap().content, @r###"
import { Schema } from "mongoose";
import { TagSchema } from 'src/domain/shop/tag.schema';

/** An order */
const OrderSchema = new Schema({
    /** labels */
    tags: [ TagSchema ],
    status: { type: String, enum: [ 'OPEN', 'CLOSED' ] },
    owner: Schema.Types.Mixed,
    current: TagSchema,
    id: Schema.Types.ObjectId,
});

export { OrderSchema };
"###);

        let page = render(&ctx, "Page").unwrap().content;
        assert!(page.contains("    current: Schema.Types.Mixed,\n"));
    }

    #[test]
    fn test_parameter_passed_through_two_levels_is_mixed() {
        let ctx = context(json!({
            "Base": {
                "type": "obj",
                "properties": {"injection": "U"},
                "attributes": {"value": {"type": "U"}}
            },
            "Mid": {
                "type": "obj",
                "properties": {"injection": "T", "extends": {"Base": {"injection": "T"}}},
                "attributes": {"other": {"type": "T"}}
            },
            "Leaf": {"type": "obj", "properties": {"extends": {"Mid": {"injection": "Order"}}}},
            "Order": {"type": "obj"}
        }));

        let leaf = render(&ctx, "Leaf").unwrap().content;
        assert!(leaf.contains("import { OrderSchema } from 'src/domain/order.schema';\n"));
        assert!(leaf.contains("    other: OrderSchema,\n"));
        assert!(leaf.contains("    value: Schema.Types.Mixed,\n"));

        let mid = render(&ctx, "Mid").unwrap().content;
        assert!(mid.contains("    other: Schema.Types.Mixed,\n"));
        assert!(mid.contains("    value: Schema.Types.Mixed,\n"));
    }

    #[test]
    fn test_self_reference_is_mixed() {
        let ctx = context(json!({
            "Node": {
                "type": "obj",
                "attributes": {
                    "label": {"type": "String"},
                    "next": {"type": "Node"},
                    "children": {"type": "List", "injection": "Node"}
                }
            }
        }));

        insta::assert_snapshot!(render(&ctx, "Node").unwrap().content, @r###"
import { Schema } from "mongoose";

const NodeSchema = new Schema({
    label: String,
    next: Schema.Types.Mixed,
    children: [ Schema.Types.Mixed ],
});

export { NodeSchema };
"###);
    }

    #[test]
    fn test_enum_and_abstract_have_no_file() {
        let ctx = context(json!({
            "Status": {"type": "obj", "properties": {"classType": "ENUM"}, "attributes": ["A"]},
            "Base": {"type": "obj", "properties": {"classType": "ABSTRACT_CLASS"}}
        }));
        assert!(render(&ctx, "Status").is_none());
        assert!(render(&ctx, "Base").is_none());
    }

    #[test]
    fn test_empty_class_schema() {
        let ctx = context(json!({"Empty": {"type": "obj"}}));
        let content = render(&ctx, "Empty").unwrap().content;
        assert_eq!(
            content,
            "import { Schema } from \"mongoose\";\n\nconst EmptySchema = new Schema({\n});\n\nexport { EmptySchema };\n"
        );
    }
}
