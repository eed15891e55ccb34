//! Scope-chain visibility and deployment-path lookups.

use blueprint::{
    Address, Value,
    scope::{self, ScopeChain},
};

use crate::helpers::{at, doc, get, resolve, resolved};

#[test]
fn test_earlier_sibling_wins_and_later_siblings_are_invisible() {
    let tree = resolved(
        r#"{
            "A": {"X": 1, "inner": {"ref": "${X}"}},
            "B": {"X": 2, "ref": "${X}"},
            "C": {"ref": "${X}"}
        }"#,
    );
    assert_eq!(get(&tree, &["A", "inner", "ref"]), &Value::Int(1));
    assert_eq!(get(&tree, &["B", "ref"]), &Value::Int(2));
    // Below both A and B, A is found first
    assert_eq!(get(&tree, &["C", "ref"]), &Value::Int(1));
}

#[test]
fn test_no_forward_visibility() {
    let err = resolve(
        r#"{
            "A": {"ref": "${Y}"},
            "B": {"Y": 1}
        }"#,
    )
    .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.address(), Some(&at(&["A", "ref"])));
}

#[test]
fn test_innermost_scope_wins() {
    let tree = resolved(
        r#"{
            "port": 1,
            "outer": {"port": 2, "inner": {"port": 3, "ref": "${port}"}, "ref": "${port}"},
            "ref": "${port}"
        }"#,
    );
    assert_eq!(get(&tree, &["outer", "inner", "ref"]), &Value::Int(3));
    assert_eq!(get(&tree, &["outer", "ref"]), &Value::Int(2));
    assert_eq!(get(&tree, &["ref"]), &Value::Int(1));
}

#[test]
fn test_sequences_are_transparent() {
    let tree = resolved(r#"{"port": 80, "list": [{"ref": "${port}"}, "${port}"]}"#);
    assert_eq!(
        tree.read(&Address::root().key("list").index(0).key("ref"))
            .unwrap(),
        &Value::Int(80)
    );
    assert_eq!(
        tree.read(&Address::root().key("list").index(1)).unwrap(),
        &Value::Int(80)
    );
}

#[test]
fn test_candidates_are_innermost_first() {
    let tree = doc(r#"{"a": {"b": {"c": 1}}}"#);
    let chain = ScopeChain::new(&tree);
    let candidates: Vec<_> = chain
        .candidates(&at(&["a", "b", "c"]))
        .into_iter()
        .map(|level| level.address)
        .collect();
    assert_eq!(
        candidates,
        vec![at(&["a", "b", "c"]), at(&["a", "b"]), at(&["a"]), Address::root()]
    );
}

#[test]
fn test_find_by_path_is_independent_of_the_referencing_address() {
    let tree = doc(
        r#"{
            "Nodes": {
                "n1": {
                    "Group:groupA": {
                        "Components": {
                            "compB": {"ComponentName": "x", "EnvironmentVariables": {"K": 1}}
                        }
                    }
                }
            },
            "probe": 0,
            "deep": {"nested": {"probe": 0}}
        }"#,
    );
    let chain = ScopeChain::new(&tree);
    let expected = at(&["Nodes", "n1", "Group:groupA", "Components", "compB"]);

    for from in [
        at(&["probe"]),
        at(&["deep", "nested", "probe"]),
        at(&["Nodes", "n1", "Group:groupA", "Components", "compB", "EnvironmentVariables", "K"]),
    ] {
        let found = chain.find_by_path("groupA/compB", &from).unwrap();
        assert_eq!(found.address, expected, "from {from}");
    }

    let found = chain.find_by_path("n1/groupA/compB/K", &at(&["probe"])).unwrap();
    assert_eq!(found.value, &Value::Int(1));
}

#[test]
fn test_deployment_path_references() {
    let tree = resolved(
        r#"{
            "Nodes": {
                "db_host": {
                    "Group:db": {
                        "Components": {
                            "pg": {"ComponentName": "postgres", "EnvironmentVariables": {"PORT": 5432}}
                        }
                    }
                },
                "app_host": {
                    "Group:app": {
                        "Components": {
                            "web": {
                                "ComponentName": "echo",
                                "EnvironmentVariables": {"DB_PORT": "${db/pg/PORT}"}
                            }
                        }
                    }
                }
            }
        }"#,
    );
    assert_eq!(
        get(
            &tree,
            &["Nodes", "app_host", "Group:app", "Components", "web", "EnvironmentVariables", "DB_PORT"]
        ),
        &Value::Int(5432)
    );
}

#[test]
fn test_position_helpers() {
    let address = at(&[
        "Nodes",
        "n1",
        "Group:outer",
        "Group:inner",
        "Components",
        "web",
    ]);
    assert_eq!(scope::parent_node(&address), Some(at(&["Nodes", "n1"])));
    assert_eq!(
        scope::main_parent_component_group(&address),
        Some(at(&["Nodes", "n1", "Group:outer"]))
    );
    assert_eq!(scope::ancestor_group_names(&address), vec!["inner", "outer"]);
    assert_eq!(scope::deployment_id(&address), "n1/outer/inner/web");
}
