//! Key directives: deletion, disambiguation and presence tests.

use blueprint::{Value, resolve::ResolverConfig};

use crate::helpers::{get, keys_at, resolve, resolve_with, resolved};

#[test]
fn test_delete_prefix() {
    let (tree, report) = resolve_with(
        ResolverConfig::default(),
        r#"{"~old": {"x": "${undefined}"}, "keep": 2, "inner": {"~gone": 1, "stays": 1}}"#,
    )
    .unwrap();
    assert_eq!(keys_at(&tree, &[]), vec!["keep", "inner"]);
    assert_eq!(keys_at(&tree, &["inner"]), vec!["stays"]);
    assert_eq!(report.entries_deleted, 2);
}

#[test]
fn test_disambiguation_marker_is_stripped() {
    let tree = resolved(r#"{"port##a": 1, "name##main-1": "web"}"#);
    assert_eq!(keys_at(&tree, &[]), vec!["port", "name"]);
}

#[test]
fn test_presence_tests_select_between_alternatives() {
    let description = r#"{
        "Env": "prod",
        "db##dev@if:'${Env}' == 'dev'": {"host": "localhost"},
        "db##prod@if:'${Env}' == 'prod'": {"host": "db.internal"},
        "after": 1
    }"#;
    let tree = resolved(description);
    assert_eq!(keys_at(&tree, &[]), vec!["Env", "db", "after"]);
    assert_eq!(get(&tree, &["db", "host"]), &Value::from("db.internal"));
}

#[test]
fn test_presence_test_sees_hash_marks_as_written() {
    let tree = resolved(
        r#"{
            "Tag": "build##7",
            "kept##a@if:'${Tag}' == 'build##7'": 1,
            "dropped##b@if:'${Tag}' == 'build'": 2
        }"#,
    );
    assert_eq!(keys_at(&tree, &[]), vec!["Tag", "kept"]);
}

#[test]
fn test_presence_test_requires_exactly_true() {
    let tree = resolved(
        r#"{
            "debug": true,
            "count": 2,
            "verbose@if:${debug}": 1,
            "numeric@if:${count}": 1,
            "text@if:'yes'": 1,
            "compared@if:${count} == 2": 1,
            "negated@if:not ${debug}": 1
        }"#,
    );
    assert_eq!(keys_at(&tree, &[]), vec!["debug", "count", "verbose", "compared"]);
}

#[test]
fn test_presence_test_before_template_use() {
    let tree = resolved(
        r#"{
            "svc@template": {"replicas": 1},
            "web##1@use:svc@if:True": {"replicas": 3},
            "web##2@use:svc@if:False": {"replicas": 5}
        }"#,
    );
    assert_eq!(keys_at(&tree, &[]), vec!["svc@template", "web"]);
    assert_eq!(get(&tree, &["web", "replicas"]), &Value::Int(3));
}

#[test]
fn test_template_definitions_are_not_resolved() {
    let tree = resolved(r#"{"t##x@template": {"x": "${missing}", "~y": 1}}"#);
    assert_eq!(keys_at(&tree, &[]), vec!["t@template"]);
    assert_eq!(keys_at(&tree, &["t@template"]), vec!["x", "~y"]);
}

#[test]
fn test_failing_presence_test() {
    let err = resolve(r#"{"x@if:undefined_name": 1}"#).unwrap_err();
    assert!(err.is_expression_error());

    let err = resolve(r#"{"x@if:${undefined_name}": 1}"#).unwrap_err();
    assert!(err.is_not_found());
}
