//! `${ref}`, inline functions and raw expressions.

use blueprint::{Value, resolve::ResolverConfig};

use crate::helpers::{at, get, keys_at, resolve, resolve_with, resolved};

#[test]
fn test_whole_string_reference_keeps_the_type() {
    let tree = resolved(
        r#"{
            "port": 8080, "ratio": 2.0, "debug": true, "name": "web",
            "a": "${port}", "b": "${ratio}", "c": "${debug}", "d": "${name}"
        }"#,
    );
    assert_eq!(get(&tree, &["a"]), &Value::Int(8080));
    assert_eq!(get(&tree, &["b"]), &Value::Float(2.0));
    assert_eq!(get(&tree, &["c"]), &Value::Bool(true));
    assert_eq!(get(&tree, &["d"]), &Value::from("web"));
}

#[test]
fn test_extreme_floats_keep_their_type() {
    let tree = resolved(
        r#"{"big": 1e20, "tiny": 1.5e-7, "a": "${big}", "b": "${tiny}", "c": "<<big: big * 10>>"}"#,
    );
    assert_eq!(get(&tree, &["a"]), &Value::Float(1e20));
    assert_eq!(get(&tree, &["b"]), &Value::Float(1.5e-7));
    assert_eq!(get(&tree, &["c"]), &Value::Float(1e21));
}

#[test]
fn test_embedded_reference_is_text() {
    let tree = resolved(
        r#"{
            "host": "db", "port": 5432, "flags": {"a": 1},
            "url": "postgres://${host}:${port}/app",
            "json": "${flags}"
        }"#,
    );
    assert_eq!(get(&tree, &["url"]), &Value::from("postgres://db:5432/app"));
    assert_eq!(get(&tree, &["json"]), &Value::from(r#"{"a":1}"#));
}

#[test]
fn test_nested_reference_builds_a_name() {
    let tree = resolved(r#"{"Env": "prod", "port_prod": 443, "port": "${port_${Env}}"}"#);
    assert_eq!(get(&tree, &["port"]), &Value::Int(443));
}

#[test]
fn test_references_in_keys() {
    let tree = resolved(r#"{"name": "web", "${name}_port": 1, "after": 2}"#);
    assert_eq!(keys_at(&tree, &[]), vec!["name", "web_port", "after"]);
}

#[test]
fn test_inline_functions() {
    let tree = resolved(
        r#"{
            "base": 8000,
            "count": 3,
            "next": "<<base: base + 1>>",
            "ports": "<<base, count: [p1 + i for i in range(p2)]>>",
            "label": "port-<<base: str(base)>>"
        }"#,
    );
    assert_eq!(get(&tree, &["next"]), &Value::Int(8001));
    assert_eq!(get(&tree, &["ports"]), &Value::from("[8000, 8001, 8002]"));
    assert_eq!(get(&tree, &["label"]), &Value::from("port-8000"));
}

#[test]
fn test_inline_function_assignment_writes_back() {
    let tree = resolved(
        r#"{
            "counter": 1,
            "first": "<<counter = counter + 1>>",
            "second": "<<counter = counter + 1>>",
            "seen": "${counter}"
        }"#,
    );
    assert_eq!(get(&tree, &["first"]), &Value::Int(2));
    assert_eq!(get(&tree, &["second"]), &Value::Int(3));
    assert_eq!(get(&tree, &["counter"]), &Value::Int(3));
    assert_eq!(get(&tree, &["seen"]), &Value::Int(3));
}

#[test]
fn test_raw_expressions() {
    let tree = resolved(
        r#"{
            "replicas": 3,
            "total": "$<${replicas} * 2>",
            "mode": "$<'ha' if ${replicas} > 1 else 'single'>",
            "name": "worker-$<${replicas} - 1>"
        }"#,
    );
    assert_eq!(get(&tree, &["total"]), &Value::Int(6));
    assert_eq!(get(&tree, &["mode"]), &Value::from("ha"));
    assert_eq!(get(&tree, &["name"]), &Value::from("worker-2"));
}

#[test]
fn test_expressions_compare_with_angle_brackets() {
    let tree = resolved(
        r#"{
            "a": 5,
            "raw": "$<3 > 2>",
            "at_least": "<<a: a >= 1>>",
            "above": "<<a: a > 1>>",
            "below": "<<a: a < 1>>",
            "text": "min $<${a} <= 2> max $<${a} > 2>"
        }"#,
    );
    assert_eq!(get(&tree, &["raw"]), &Value::Bool(true));
    assert_eq!(get(&tree, &["at_least"]), &Value::Bool(true));
    assert_eq!(get(&tree, &["above"]), &Value::Bool(true));
    assert_eq!(get(&tree, &["below"]), &Value::Bool(false));
    assert_eq!(get(&tree, &["text"]), &Value::from("min False max True"));
}

#[test]
fn test_unterminated_expressions_fail() {
    let err = resolve(r#"{"x": "$<1 + 2"}"#).unwrap_err();
    assert!(err.is_expression_error());
    assert_eq!(err.address(), Some(&at(&["x"])));

    let err = resolve(r#"{"a": 1, "x": "<<a: a + 1"}"#).unwrap_err();
    assert!(err.is_expression_error());
}

#[test]
fn test_reference_cycles_hit_the_bound() {
    let err = resolve(r#"{"a": "${b}", "b": "${a}"}"#).unwrap_err();
    assert!(err.is_loop_bound());
    assert_eq!(err.address(), Some(&at(&["a"])));

    let err = resolve(r#"{"x": "${x}"}"#).unwrap_err();
    assert!(err.is_loop_bound());
}

#[test]
fn test_iteration_bound_is_configurable() {
    let description = r#"{"x": "${d}", "d": "${c}", "c": "${b}", "b": "${a}", "a": 1}"#;

    let (tree, _) = resolve_with(ResolverConfig::default(), description).unwrap();
    assert_eq!(get(&tree, &["x"]), &Value::Int(1));

    let err = resolve_with(ResolverConfig::default().with_max_iterations(2), description)
        .unwrap_err();
    assert!(err.is_loop_bound());
}

#[test]
fn test_missing_reference() {
    let err = resolve(r#"{"group": {"x": "${nowhere}"}}"#).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "resolve");
    assert_eq!(err.address(), Some(&at(&["group", "x"])));
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn test_failing_expressions() {
    let err = resolve(r#"{"x": "$<1 // 0>"}"#).unwrap_err();
    assert!(err.is_expression_error());

    let err = resolve(r#"{"x": "$<open('/etc/passwd')>"}"#).unwrap_err();
    assert!(err.is_expression_error());
    assert_eq!(err.address(), Some(&at(&["x"])));
}
