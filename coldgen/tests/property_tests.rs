//! Property-based tests for coldgen.
//!
//! Properties tested:
//! - Every class node is processed exactly once by every emitter
//! - Per-class files carry the emitter's file extension
//! - Dry runs leave the output tree untouched
//! - Comment blocks stay framed and within the configured width

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

use coldgen::domain::Description;
use coldgen::render::comment_block;
use coldgen::{
    run_emitter, ClassEmitter, DomainModel, Emitter, FileWriter, GenerationContext, JavaTarget,
    ModelEmitter, NoopProgress, SchemaEmitter, ScriptTarget, Settings, TypeRegistries,
};

// =============================================================================
// Generators for property tests
// =============================================================================

/// Generate a set of distinct class names.
fn arb_class_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("[A-Z][a-z]{2,8}", 1..12)
}

/// A domain tree: each class lands in one of a few packages, with a few
/// non-class nodes mixed in.
fn arb_domain() -> impl Strategy<Value = (Value, usize)> {
    arb_class_names()
        .prop_flat_map(|names| {
            let n = names.len();
            (
                Just(names),
                prop::collection::vec(0usize..4, n),
                prop::collection::vec(any::<bool>(), n),
                0usize..4,
            )
        })
        .prop_map(|(names, packages, enums, notes)| {
            let mut root = Map::new();
            for ((name, pkg), is_enum) in names.iter().zip(packages).zip(enums) {
                let class = if is_enum {
                    json!({"type": "obj", "properties": {"classType": "ENUM"}, "attributes": ["A", "B"]})
                } else {
                    json!({"type": "obj", "attributes": {"label": {"type": "String"}}})
                };
                let target = if pkg == 0 {
                    &mut root
                } else {
                    root.entry(format!("pkg{pkg}"))
                        .or_insert_with(|| json!({}))
                        .as_object_mut()
                        .unwrap()
                };
                target.insert(name.clone(), class);
            }
            for i in 0..notes {
                root.insert(format!("note{i}"), json!({"type": "text", "value": i}));
            }
            let count = names.len();
            (Value::Object(root), count)
        })
}

fn context(domain: &Value) -> GenerationContext {
    GenerationContext::new(
        DomainModel::from_value(domain).unwrap(),
        TypeRegistries::default(),
        Settings::new("1.0.0"),
    )
}

fn arb_description() -> impl Strategy<Value = Description> {
    prop_oneof![
        "[a-z ]{1,120}".prop_map(Description::Line),
        prop::collection::vec("[a-z ]{0,60}", 0..5).prop_map(Description::Lines),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_every_class_is_processed_once((domain, count) in arb_domain()) {
        let ctx = context(&domain);
        prop_assert_eq!(ctx.model.class_count(), count);

        let temp = TempDir::new().unwrap();
        let emitters: Vec<Box<dyn Emitter>> = vec![
            Box::new(ClassEmitter::new(JavaTarget::new(
                temp.path().join("java"),
                json!({"project": {"groupId": "org.demo", "artifactId": "demo"}}),
            ))),
            Box::new(ModelEmitter::new(ScriptTarget::new(temp.path().join("model"), json!({}), json!({})))),
            Box::new(SchemaEmitter::new(ScriptTarget::new(temp.path().join("schema"), json!({}), json!({})))),
        ];

        let writer = FileWriter::new(true);
        for emitter in &emitters {
            let report = run_emitter(emitter.as_ref(), &ctx, &writer, &mut NoopProgress).unwrap();
            prop_assert_eq!(report.processed, count);
            prop_assert_eq!(report.total, count);
            prop_assert!(report.is_success());

            let paths: HashSet<_> = report.written.iter().map(|r| r.path().to_path_buf()).collect();
            prop_assert_eq!(paths.len(), report.written.len());
            prop_assert!(!emitter.output_root().exists());

            let project = emitter.project_files(&ctx).unwrap().len();
            let per_class = paths
                .iter()
                .filter(|p| p.extension().is_some_and(|e| e == emitter.file_extension()))
                .count();
            prop_assert_eq!(per_class, report.written.len() - project);
        }
    }

    #[test]
    fn prop_comment_block_is_framed_and_bounded(
        desc in arb_description(),
        width in 4usize..40,
    ) {
        let block = comment_block(&desc, width);
        if block.len() == 1 {
            prop_assert!(block[0].starts_with("/**"));
            prop_assert!(block[0].ends_with("*/"));
        } else if !block.is_empty() {
            prop_assert_eq!(block.first().map(String::as_str), Some("/**"));
            prop_assert_eq!(block.last().map(String::as_str), Some(" */"));
            for line in &block[1..block.len() - 1] {
                let body = line.strip_prefix(" * ").or_else(|| line.strip_prefix(" *")).unwrap();
                let body = body.strip_suffix('-').unwrap_or(body);
                prop_assert!(body.chars().count() <= width, "{line:?} exceeds {width}");
            }
        }
    }
}
