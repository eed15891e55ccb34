//! Addressing, mutation and persistence of description trees.

use blueprint::{Address, Value, tree};

use crate::helpers::{at, doc, get, keys_at};

#[test]
fn test_read_through_maps_and_sequences() {
    let tree = doc(r#"{"a": {"b": [10, {"c": "deep"}]}}"#);
    let address = Address::root().key("a").key("b").index(1).key("c");
    assert_eq!(tree.read(&address).unwrap(), &Value::from("deep"));
    assert_eq!(address.to_string(), "a/b/1/c");
}

#[test]
fn test_read_errors_carry_the_address() {
    let tree = doc(r#"{"a": {"b": [10]}}"#);

    let err = tree.read(&at(&["a", "missing"])).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.address(), Some(&at(&["a", "missing"])));

    let err = tree
        .read(&Address::root().key("a").key("b").key("x"))
        .unwrap_err();
    assert!(err.is_type_mismatch());

    let err = tree.read(&Address::root().key("a").index(0)).unwrap_err();
    assert!(err.is_type_mismatch());
}

#[test]
fn test_read_or_default() {
    let tree = doc(r#"{"a": 1}"#);
    let fallback = Value::from("fallback");
    assert_eq!(
        tree.read_or(&at(&["missing"]), &fallback).unwrap(),
        &fallback
    );
    assert_eq!(tree.read_or(&at(&["a"]), &fallback).unwrap(), &Value::Int(1));
}

#[test]
fn test_write_requires_existing_parent() {
    let mut tree = doc(r#"{"a": {"list": [1]}}"#);

    tree.write(&at(&["a", "new"]), "value").unwrap();
    assert_eq!(keys_at(&tree, &["a"]), vec!["list", "new"]);

    tree.write(&Address::root().key("a").key("list").index(1), 2)
        .unwrap();
    assert_eq!(
        get(&tree, &["a", "list"]),
        &Value::Sequence(vec![Value::Int(1), Value::Int(2)])
    );

    let err = tree.write(&at(&["nope", "child"]), 1).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_rename_keeps_position() {
    let mut tree = doc(r#"{"x": 1, "y": 2, "z": 3}"#);
    tree.rename_last_key(&at(&["y"]), "w", None).unwrap();
    assert_eq!(keys_at(&tree, &[]), vec!["x", "w", "z"]);
    assert_eq!(get(&tree, &["w"]), &Value::Int(2));

    tree.rename_last_key(&at(&["w"]), "v", Some(Value::from("new")))
        .unwrap();
    assert_eq!(keys_at(&tree, &[]), vec!["x", "v", "z"]);
    assert_eq!(get(&tree, &["v"]), &Value::from("new"));
}

#[test]
fn test_rename_onto_existing_key_keeps_keys_unique() {
    let mut tree = doc(r#"{"x": 1, "y": 2, "z": 3}"#);
    tree.rename_last_key(&at(&["x"]), "z", None).unwrap();
    assert_eq!(keys_at(&tree, &[]), vec!["z", "y"]);
    assert_eq!(get(&tree, &["z"]), &Value::Int(1));
}

#[test]
fn test_delete() {
    let mut tree = doc(r#"{"a": {"b": 1}, "list": [1, 2, 3]}"#);
    assert_eq!(tree.delete(&at(&["a", "b"])).unwrap(), Some(Value::Int(1)));
    assert_eq!(tree.delete(&at(&["a", "b"])).unwrap(), None);
    assert_eq!(tree.delete(&at(&["nope", "b"])).unwrap(), None);

    tree.delete(&Address::root().key("list").index(0)).unwrap();
    assert_eq!(
        get(&tree, &["list"]),
        &Value::Sequence(vec![Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn test_parse_strips_comments_outside_strings() {
    let tree = tree::parse_commented(
        r#"{
            // the endpoint
            "url": "http://example.com/path", // trailing
            "port": 8080
        }"#,
    )
    .unwrap();
    assert_eq!(get(&tree, &["url"]), &Value::from("http://example.com/path"));
    assert_eq!(get(&tree, &["port"]), &Value::Int(8080));
}

#[test]
fn test_parse_rejects_non_map_roots_and_bad_json() {
    let err = tree::parse_commented("[1, 2]").unwrap_err();
    assert_eq!(err.module(), "tree");

    let err = tree::parse_commented(r#"{"a": }"#).unwrap_err();
    assert_eq!(err.module(), "serialize");
}

#[test]
fn test_pretty_output_format() {
    let tree = doc(r#"{"b": [1, 2.0], "a": true}"#);
    let text = tree::to_pretty_string(&tree).unwrap();
    assert_eq!(
        text,
        "{\n    \"b\": [\n        1,\n        2.0\n    ],\n    \"a\": true\n}\n"
    );
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("description.json");

    let original = doc(r#"{"Project": "demo", "Nodes": {"n1": {"k": [1, null, "x"]}}}"#);
    tree::save(&path, &original).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.ends_with("}\n"));
    assert!(written.contains("\n    \"Project\": \"demo\","));

    let loaded = tree::load(&path).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = tree::load(dir.path().join("absent.json")).unwrap_err();
    assert!(err.is_io_error());
}
