//! End-to-end create compilation against the in-memory catalog.

use serde_json::json;
use std::sync::Arc;
use tabula::compiler::{compile_create, SplitSpec};
use tabula::descriptor::{BloomType, Compression, KeepDeletedCells, FOREVER};
use tabula::{Arg, CompileContext, Error, MemoryCatalog, PropertyBag, SchemaShell};

// ── Helper ──────────────────────────────────────────────────────────────────

fn bag(value: serde_json::Value) -> Arg {
    Arg::Bag(serde_json::from_value::<PropertyBag>(value).unwrap())
}

fn shell() -> (Arc<MemoryCatalog>, SchemaShell) {
    let catalog = Arc::new(MemoryCatalog::new());
    let shell = SchemaShell::new(catalog.clone(), Arc::new(CompileContext::new()));
    (catalog, shell)
}

// ── Families ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_with_family_and_explicit_splits() {
    let (catalog, shell) = shell();
    let plan = shell
        .create_table(
            "t1",
            &[
                bag(json!({"NAME": "cf1", "VERSIONS": 3, "TTL": 100})),
                bag(json!({"SPLITS": ["a", "m", "z"]})),
            ],
        )
        .await
        .unwrap();

    let cf1 = plan.descriptor.family("cf1").unwrap();
    assert_eq!(cf1.max_versions, 3);
    assert_eq!(cf1.ttl, 100);
    assert_eq!(plan.split_spec.as_ref().map(|s| s.mode()), Some("explicit"));

    let name = plan.descriptor.name.clone();
    assert_eq!(
        catalog.splits(&name).unwrap(),
        vec![b"a".to_vec(), b"m".to_vec(), b"z".to_vec()]
    );
    assert!(shell.exists("t1").await.unwrap());
    assert_eq!(shell.describe("default:t1").await.unwrap(), plan.descriptor);
}

#[test]
fn test_bare_family_names_get_defaults() {
    let plan = compile_create("t1", &[Arg::name("a"), Arg::name("b")], &CompileContext::new()).unwrap();
    assert_eq!(plan.descriptor.family_names(), vec!["a", "b"]);
    let a = plan.descriptor.family("a").unwrap();
    assert_eq!(a.max_versions, 1);
    assert_eq!(a.ttl, FOREVER);
    assert_eq!(a.bloom_filter, BloomType::Row);
    assert!(plan.splits.is_empty());
    assert!(plan.warnings.is_empty());
}

#[test]
fn test_family_attributes_are_typed() {
    let plan = compile_create(
        "t1",
        &[bag(json!({
            "NAME": "cf",
            "COMPRESSION": "snappy",
            "BLOOMFILTER": "ROWCOL",
            "IN_MEMORY": "true",
            "KEEP_DELETED_CELLS": true,
            "TTL": "1 DAY 2 HOURS",
            "METADATA": {"owner": "ops"},
            "CONFIGURATION": {"hbase.hstore.blockingStoreFiles": 20}
        }))],
        &CompileContext::new(),
    )
    .unwrap();

    let cf = plan.descriptor.family("cf").unwrap();
    assert_eq!(cf.compression, Compression::Snappy);
    assert_eq!(cf.bloom_filter, BloomType::Rowcol);
    assert!(cf.in_memory);
    assert_eq!(cf.keep_deleted_cells, KeepDeletedCells::True);
    assert_eq!(cf.ttl, 86_400 + 7_200);
    assert_eq!(cf.metadata.get("owner").map(String::as_str), Some("ops"));
    assert_eq!(
        cf.configuration.get("hbase.hstore.blockingStoreFiles").map(String::as_str),
        Some("20")
    );
}

#[test]
fn test_invalid_enum_names_allowed_values() {
    let err = compile_create(
        "t1",
        &[bag(json!({"NAME": "cf", "COMPRESSION": "BROTLI"}))],
        &CompileContext::new(),
    )
    .unwrap_err();
    match err {
        Error::InvalidEnumValue { field, value, allowed } => {
            assert_eq!(field, "COMPRESSION");
            assert_eq!(value, "BROTLI");
            assert!(allowed.iter().any(|a| a == "SNAPPY"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_family_key_is_a_warning() {
    let plan = compile_create(
        "t1",
        &[bag(json!({"NAME": "cf", "VERSION": 3}))],
        &CompileContext::new(),
    )
    .unwrap();
    assert_eq!(plan.warnings.len(), 1);
    assert_eq!(plan.warnings[0].kind(), "unknown_family_key");
    assert_eq!(plan.descriptor.family("cf").unwrap().max_versions, 1);
}

#[test]
fn test_repeated_family_keeps_last_definition() {
    let plan = compile_create(
        "t1",
        &[
            bag(json!({"NAME": "cf", "VERSIONS": 5, "IN_MEMORY": true})),
            bag(json!({"NAME": "cf", "TTL": 10})),
        ],
        &CompileContext::new(),
    )
    .unwrap();
    let cf = plan.descriptor.family("cf").unwrap();
    assert_eq!(cf.max_versions, 1);
    assert!(!cf.in_memory);
    assert_eq!(cf.ttl, 10);
    assert_eq!(plan.descriptor.families().len(), 1);
    assert_eq!(plan.warnings[0].kind(), "family_replaced");
}

// ── Table attributes ────────────────────────────────────────────────────────

#[test]
fn test_table_attributes_and_coprocessor() {
    let plan = compile_create(
        "ns1:t1",
        &[
            Arg::name("cf"),
            bag(json!({
                "OWNER": "alice",
                "MAX_FILESIZE": 1048576,
                "DURABILITY": "ASYNC_WAL",
                "METADATA": {"team": "search"},
                "coprocessor": "hdfs:///cp.jar|com.example.Observer|1001|arg1=1,arg2=2"
            })),
        ],
        &CompileContext::new(),
    )
    .unwrap();

    let desc = &plan.descriptor;
    assert_eq!(desc.name.namespace(), "ns1");
    assert_eq!(desc.owner(), Some("alice"));
    assert_eq!(desc.max_file_size(), Some(1_048_576));
    assert_eq!(desc.value("team"), Some("search"));
    assert_eq!(desc.metadata().collect::<Vec<_>>(), vec![("team", "search")]);
    let cp = &desc.coprocessors()[0];
    assert_eq!(cp.class_name, "com.example.Observer");
    assert_eq!(cp.priority, 1001);
    assert_eq!(cp.properties.get("arg2").map(String::as_str), Some("2"));
}

#[test]
fn test_no_families_is_rejected() {
    let err = compile_create("t1", &[bag(json!({"OWNER": "bob"}))], &CompileContext::new())
        .unwrap_err();
    assert!(matches!(err, Error::NoColumnFamilyDefined(_)));
    assert!(err.is_validation());
}

// ── Splits ──────────────────────────────────────────────────────────────────

#[test]
fn test_algorithmic_split() {
    let plan = compile_create(
        "t1",
        &[
            Arg::name("cf"),
            bag(json!({"NUMREGIONS": 4, "SPLITALGO": "HexStringSplit"})),
        ],
        &CompileContext::new(),
    )
    .unwrap();
    assert_eq!(
        plan.split_spec,
        Some(SplitSpec::Algorithmic {
            count: 4,
            algorithm: "HexStringSplit".into()
        })
    );
    assert_eq!(
        plan.splits,
        vec![b"3fffffff".to_vec(), b"7ffffffe".to_vec(), b"bffffffd".to_vec()]
    );
}

#[test]
fn test_split_modes_conflict_across_bags() {
    let err = compile_create(
        "t1",
        &[
            Arg::name("cf"),
            bag(json!({"SPLITS": ["a"]})),
            bag(json!({"NUMREGIONS": 2, "SPLITALGO": "UniformSplit"})),
        ],
        &CompileContext::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn test_splits_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("splits.txt");
    std::fs::write(&path, "b\nd\n\\x00f\n").unwrap();

    let plan = compile_create(
        "t1",
        &[
            Arg::name("cf"),
            bag(json!({"SPLITS_FILE": path.to_string_lossy()})),
        ],
        &CompileContext::new(),
    )
    .unwrap();
    assert_eq!(
        plan.splits,
        vec![b"b".to_vec(), b"d".to_vec(), vec![0x00, b'f']]
    );
    assert_eq!(
        plan.descriptor.value("SPLITS_FILE"),
        Some(path.to_string_lossy().as_ref())
    );
}

// ── Catalog errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_twice_fails() {
    let (_, shell) = shell();
    shell.create_table("t1", &[Arg::name("cf")]).await.unwrap();
    let err = shell.create_table("t1", &[Arg::name("cf")]).await.unwrap_err();
    assert!(matches!(err, Error::TableExists(_)));
}

#[tokio::test]
async fn test_create_in_unknown_namespace_fails() {
    let (catalog, shell) = shell();
    let err = shell.create_table("nope:t1", &[Arg::name("cf")]).await.unwrap_err();
    assert!(matches!(err, Error::NamespaceNotFound(_)));
    assert_eq!(catalog.table_count(), 0);
}

#[tokio::test]
async fn test_plan_create_does_not_submit() {
    let (catalog, shell) = shell();
    let plan = shell.plan_create("t1", &[Arg::name("cf")]).unwrap();
    assert_eq!(plan.descriptor.family_names(), vec!["cf"]);
    assert_eq!(catalog.table_count(), 0);
}
