//! The sandboxed expression language.

use blueprint::expr::{BUILTINS, EvalValue, Evaluator, ExprError, parse_literal};

fn eval(src: &str) -> Result<EvalValue, ExprError> {
    Evaluator::default().evaluate(src)
}

#[test]
fn test_allow_list_is_exactly_five_builtins() {
    assert_eq!(BUILTINS, &["int", "str", "range", "enumerate", "len"]);

    assert_eq!(eval("int('42') + 1").unwrap(), EvalValue::Int(43));
    assert_eq!(eval("str(7) + 'x'").unwrap(), EvalValue::Str("7x".to_string()));
    assert_eq!(eval("len(range(2, 10, 3))").unwrap(), EvalValue::Int(3));
    assert_eq!(
        eval("[i * v for i, v in enumerate([10, 20])]")
            .unwrap()
            .to_string(),
        "[0, 20]"
    );
}

#[test]
fn test_names_outside_the_allow_list_are_rejected() {
    for src in [
        "open('x')",
        "__import__('os')",
        "eval('1')",
        "print(1)",
        "undefined_name + 1",
    ] {
        let err = eval(src).unwrap_err();
        assert!(err.is_sandbox_violation(), "{src} gave {err}");
    }
}

#[test]
fn test_attribute_access_is_a_syntax_error() {
    let err = eval("'a'.upper()").unwrap_err();
    assert!(err.is_syntax_error());
}

#[test]
fn test_bindings() {
    let evaluator = Evaluator::default();
    let bindings = vec![
        ("port".to_string(), EvalValue::Int(8000)),
        ("p1".to_string(), EvalValue::Int(8000)),
        (
            "hosts".to_string(),
            EvalValue::List(vec![
                EvalValue::Str("a".to_string()),
                EvalValue::Str("b".to_string()),
            ]),
        ),
    ];
    assert_eq!(
        evaluator
            .evaluate_with("port + len(hosts) if p1 == port else 0", &bindings)
            .unwrap(),
        EvalValue::Int(8002)
    );
}

#[test]
fn test_literal_parsing() {
    assert_eq!(parse_literal("8080"), Some(EvalValue::Int(8080)));
    assert_eq!(parse_literal("-1.5"), Some(EvalValue::Float(-1.5)));
    assert_eq!(parse_literal("True"), Some(EvalValue::Bool(true)));
    assert_eq!(parse_literal("'text'"), Some(EvalValue::Str("text".to_string())));
    assert_eq!(parse_literal("1 + 1"), None);
    assert_eq!(parse_literal("1, 2"), None);
    assert_eq!(parse_literal("web-01"), None);
}
