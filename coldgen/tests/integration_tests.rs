//! Integration tests for coldgen.
//!
//! These tests run whole emitters against a temporary output tree and check
//! the files they leave behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use coldgen::{
    run_emitter, ClassEmitter, DomainError, DomainModel, EmitReport, Emitter, FileWriter,
    GenError, GenerationContext, JavaTarget, ModelEmitter, NoopProgress, Resolver,
    SchemaEmitter, ScriptTarget, Settings, TypeRegistries, TypeRegistry, WriteError,
};

// =============================================================================
// Helpers
// =============================================================================

fn registries() -> TypeRegistries {
    let java = TypeRegistry::from_dependency_table(
        "java",
        &json!({
            "Serializable": "java.io.Serializable",
            "LocalDateTime": "java.time.LocalDateTime",
            "Set": "java.util.Set",
            "HashSet": "java.util.HashSet",
            "List": "java.util.List",
            "ArrayList": "java.util.ArrayList",
            "@Data": "lombok.Data"
        }),
    )
    .unwrap();
    let model = TypeRegistry::from_alias_table(
        "model",
        &json!({
            "string": ["String"],
            "number": ["Integer", "Long"],
            "Date": ["LocalDateTime"]
        }),
    )
    .unwrap();
    let schema = TypeRegistry::from_alias_table(
        "schema",
        &json!({
            "String": ["String"],
            "Number": ["Integer", "Long"],
            "Date": ["LocalDateTime"]
        }),
    )
    .unwrap();
    TypeRegistries::new(java, model, schema)
}

fn context(domain: Value) -> GenerationContext {
    GenerationContext::new(
        DomainModel::from_value(&domain).unwrap(),
        registries(),
        Settings::new("1.2.0"),
    )
}

fn emitters(root: &Path) -> Vec<Box<dyn Emitter>> {
    vec![
        Box::new(ClassEmitter::new(JavaTarget::new(
            root.join("java"),
            json!({"project": {"groupId": "com.acme", "artifactId": "zoo-lib", "version": "${libVersion}"}}),
        ))),
        Box::new(ModelEmitter::new(ScriptTarget::new(
            root.join("javascript"),
            json!({"name": "@acme/zoo"}),
            json!({"compilerOptions": {"strict": true}}),
        ))),
        Box::new(SchemaEmitter::new(ScriptTarget::new(
            root.join("mongoose"),
            json!({"name": "@acme/zoo-schema"}),
            json!({}),
        ))),
    ]
}

fn run_all(ctx: &GenerationContext, root: &Path) -> Vec<EmitReport> {
    let writer = FileWriter::new(false);
    emitters(root)
        .iter()
        .map(|e| run_emitter(e.as_ref(), ctx, &writer, &mut NoopProgress).unwrap())
        .collect()
}

/// Every file below `root`, keyed by relative path.
fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, String> {
    fn walk(dir: &Path, root: &Path, out: &mut BTreeMap<PathBuf, String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(rel, fs::read_to_string(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn zoo() -> Value {
    json!({
        "core": {
            "Entity": {
                "type": "obj",
                "properties": {"classType": "ABSTRACT_CLASS", "implements": "Serializable"},
                "attributes": {"id": {"type": "Long"}}
            }
        },
        "zoo": {
            "Animal": {
                "type": "obj",
                "attributes": {"name": {"type": "String"}}
            },
            "Keeper": {
                "type": "obj",
                "properties": {"extends": "Entity", "annotate": "Data"},
                "attributes": {
                    "animals": {"type": "Set", "injection": "Animal"},
                    "shift": {"type": "Shift"}
                }
            },
            "Shift": {
                "type": "obj",
                "properties": {"classType": "ENUM"},
                "attributes": ["DAY", "NIGHT"]
            },
            "notes": {"type": "text"}
        }
    })
}

// =============================================================================
// End-to-end runs
// =============================================================================

#[test]
fn test_every_emitter_processes_every_class() {
    let dir = TempDir::new().unwrap();
    let ctx = context(zoo());
    let reports = run_all(&ctx, dir.path());

    for report in &reports {
        assert_eq!(report.processed, 4, "target {}", report.target);
        assert_eq!(report.total, 4);
        assert!(report.is_success());
    }

    let schema = &reports[2];
    assert_eq!(schema.skipped, ["core/Entity", "zoo/Shift"]);
}

#[test]
fn test_animal_scenario_across_targets() {
    let dir = TempDir::new().unwrap();
    let ctx = context(zoo());
    run_all(&ctx, dir.path());

    let java = fs::read_to_string(
        dir.path()
            .join("java/src/main/java/com/acme/zoolib/domain/zoo/Animal.java"),
    )
    .unwrap();
    assert!(java.starts_with("package com.acme.zoolib.domain.zoo;\n"));
    assert!(java.contains("    private String name;\n"));
    assert!(java.contains("    public Animal name(String name) {\n"));

    let model = fs::read_to_string(dir.path().join("javascript/src/domain/zoo/animal.model.ts")).unwrap();
    assert!(model.contains("    name?: string;\n"));
    assert!(model.contains("        public name?: string,\n"));

    let schema = fs::read_to_string(dir.path().join("mongoose/src/domain/zoo/animal.schema.ts")).unwrap();
    assert!(schema.contains("    name: String,\n"));
}

#[test]
fn test_set_attribute_across_targets() {
    let dir = TempDir::new().unwrap();
    let ctx = context(zoo());
    run_all(&ctx, dir.path());

    let model = fs::read_to_string(dir.path().join("javascript/src/domain/zoo/keeper.model.ts")).unwrap();
    assert!(model.contains("    animals?: IAnimal[];\n"));
    assert!(model.contains("import { IAnimal } from 'src/domain/zoo/animal.model';\n"));
    assert!(model.contains("import { IEntity } from 'src/domain/core/entity.model';\n"));
    assert!(model.contains("export interface IKeeper extends IEntity {\n"));
    assert!(model.contains("        public id?: number,\n"));

    let schema = fs::read_to_string(dir.path().join("mongoose/src/domain/zoo/keeper.schema.ts")).unwrap();
    assert!(schema.contains("    animals: [ AnimalSchema ],\n"));
    assert!(schema.contains("    shift: { type: String, enum: [ 'DAY', 'NIGHT' ] },\n"));
    assert!(schema.contains("    id: Number,\n"));
    assert!(!dir.path().join("mongoose/src/domain/zoo/shift.schema.ts").exists());
}

#[test]
fn test_serial_version_uid_is_inherited() {
    let dir = TempDir::new().unwrap();
    let ctx = context(zoo());
    run_all(&ctx, dir.path());

    let base = dir.path().join("java/src/main/java/com/acme/zoolib/domain");
    let keeper = fs::read_to_string(base.join("zoo/Keeper.java")).unwrap();
    let animal = fs::read_to_string(base.join("zoo/Animal.java")).unwrap();

    assert!(keeper.contains("private static final long serialVersionUID = 1L;"));
    assert!(keeper.contains("import com.acme.zoolib.domain.core.Entity;\n"));
    assert!(keeper.contains("import lombok.Data;\n"));
    assert!(keeper.contains("@Data\npublic class Keeper extends Entity {\n"));
    assert!(!animal.contains("serialVersionUID"));
}

#[test]
fn test_project_files_are_written() {
    let dir = TempDir::new().unwrap();
    let ctx = context(zoo());
    run_all(&ctx, dir.path());

    let pom = fs::read_to_string(dir.path().join("java/pom.xml")).unwrap();
    assert!(pom.contains("<version>1.2.0</version>"));

    let package: Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("javascript/package.json")).unwrap())
            .unwrap();
    assert_eq!(package["version"], "1.2.0");
    assert!(dir.path().join("mongoose/tsconfig.json").exists());
}

#[test]
fn test_generation_is_idempotent() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let ctx = context(zoo());

    run_all(&ctx, first.path());
    let once = snapshot_tree(first.path());
    run_all(&ctx, first.path());
    let twice = snapshot_tree(first.path());
    run_all(&ctx, second.path());

    assert_eq!(once, twice);
    assert_eq!(once, snapshot_tree(second.path()));
}

#[test]
fn test_dry_run_leaves_disk_untouched() {
    let dir = TempDir::new().unwrap();
    let ctx = context(zoo());
    let emitters = emitters(dir.path());

    let report = run_emitter(
        emitters[1].as_ref(),
        &ctx,
        &FileWriter::new(true),
        &mut NoopProgress,
    )
    .unwrap();

    assert_eq!(report.processed, 4);
    assert_eq!(report.written.len(), 6);
    assert!(report.written.iter().all(|w| !w.was_written()));
    assert!(!dir.path().join("javascript").exists());
}

// =============================================================================
// Failure handling
// =============================================================================

#[test]
fn test_write_failure_does_not_abort_run() {
    let dir = TempDir::new().unwrap();
    // The package directory takes the path the root class needs for its file.
    let ctx = context(json!({
        "order.model.ts": {"Item": {"type": "obj"}},
        "Order": {"type": "obj"},
        "Invoice": {"type": "obj"}
    }));
    let emitters = emitters(dir.path());

    let report = run_emitter(
        emitters[1].as_ref(),
        &ctx,
        &FileWriter::new(false),
        &mut NoopProgress,
    )
    .unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0], WriteError::WriteFile { .. }));
    assert!(dir.path().join("javascript/src/domain/invoice.model.ts").exists());
    assert!(!report.is_success());
}

#[test]
fn test_cyclic_inheritance_aborts_run() {
    let dir = TempDir::new().unwrap();
    let ctx = context(json!({
        "A": {"type": "obj", "properties": {"extends": "B"}},
        "B": {"type": "obj", "properties": {"extends": "A"}}
    }));
    let emitters = emitters(dir.path());

    let err = run_emitter(
        emitters[0].as_ref(),
        &ctx,
        &FileWriter::new(false),
        &mut NoopProgress,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        GenError::Domain(DomainError::CyclicInheritance { .. })
    ));
}

#[test]
fn test_missing_parent_aborts_run() {
    let dir = TempDir::new().unwrap();
    let ctx = context(json!({"Orphan": {"type": "obj", "properties": {"extends": "Nobody"}}}));
    let emitters = emitters(dir.path());

    let err = run_emitter(
        emitters[2].as_ref(),
        &ctx,
        &FileWriter::new(false),
        &mut NoopProgress,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        GenError::Domain(DomainError::ClassNotFound { .. })
    ));
}

#[test]
fn test_duplicate_class_names_fail_fast() {
    let err = DomainModel::from_value(&json!({
        "a": {"Thing": {"type": "obj"}},
        "b": {"Thing": {"type": "obj"}}
    }))
    .unwrap_err();

    match err {
        DomainError::DuplicateClass { name, first, second } => {
            assert_eq!(name, "Thing");
            assert_eq!(first, "a/Thing");
            assert_eq!(second, "b/Thing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Resolver
// =============================================================================

#[test]
fn test_three_level_merge() {
    let model = DomainModel::from_value(&json!({
        "Grandparent": {
            "type": "obj",
            "attributes": {"a": {"type": "String"}, "shared": {"type": "Integer"}}
        },
        "Parent": {
            "type": "obj",
            "properties": {"extends": "Grandparent"},
            "attributes": {"b": {"type": "String"}, "shared": {"type": "Long"}}
        },
        "Child": {
            "type": "obj",
            "properties": {"extends": "Parent"},
            "attributes": {"c": {"type": "String"}, "shared": {"type": "String"}}
        }
    }))
    .unwrap();
    let registries = registries();
    let resolver = Resolver::new(&model, &registries);

    let merged = resolver.merged_attributes("Child").unwrap();
    let names: Vec<_> = merged.iter().map(|a| a.name()).collect();
    assert_eq!(names, ["c", "shared", "b", "a"]);

    let shared = &merged[1];
    assert_eq!(shared.ty, "String");
    assert_eq!(shared.declared_in.name, "Child");
    assert!(!shared.is_inherited_by("Child"));
    assert!(merged[3].is_inherited_by("Child"));
}

#[test]
fn test_enum_queries() {
    let ctx = context(zoo());
    let resolver = ctx.resolver();

    assert!(resolver.is_enum("Shift"));
    assert!(!resolver.is_enum("Animal"));
    assert_eq!(resolver.enum_constants("Shift").unwrap()[1].name, "NIGHT");
    assert!(matches!(
        resolver.enum_constants("Animal"),
        Err(DomainError::NotAnEnum { .. })
    ));
    assert_eq!(resolver.qualified_package_of("Keeper").unwrap(), ["zoo"]);
    assert_eq!(resolver.parent_of("Keeper").unwrap().unwrap().name(), "Entity");
    assert!(resolver.parent_of("Animal").unwrap().is_none());
    assert_eq!(resolver.class_count(), 4);
}
