//! Node, group and component structure, and identity fields.

use blueprint::Value;

use crate::helpers::{at, get, keys_at, resolve, resolved};

const COMPONENT: &[&str] = &["Nodes", "n1", "Group:svc", "Components", "web"];

#[test]
fn test_identity_fields_are_appended() {
    let tree = resolved(
        r#"{
            "Nodes": {
                "n1": {
                    "Group:svc": {
                        "Components": {
                            "web": {"ComponentName": "echo", "EnvironmentVariables": {}}
                        }
                    }
                }
            }
        }"#,
    );
    assert_eq!(keys_at(&tree, &["Nodes", "n1"]), vec!["Group:svc", "NodeName"]);
    assert_eq!(
        keys_at(&tree, &["Nodes", "n1", "Group:svc"]),
        vec!["Components", "GroupName"]
    );
    assert_eq!(
        keys_at(&tree, COMPONENT),
        vec!["ComponentName", "EnvironmentVariables", "ComponentDescriptionName"]
    );
    assert_eq!(get(&tree, &["Nodes", "n1", "NodeName"]), &Value::from("n1"));
    assert_eq!(
        get(&tree, &["Nodes", "n1", "Group:svc", "GroupName"]),
        &Value::from("svc")
    );
}

#[test]
fn test_identity_fields_can_be_referenced() {
    let tree = resolved(
        r#"{
            "Nodes": {
                "n1": {
                    "Group:outer": {
                        "Group:inner": {
                            "Components": {
                                "web": {
                                    "ComponentName": "echo",
                                    "EnvironmentVariables": {
                                        "ID": "${NodeName}-${GroupName}-${ComponentDescriptionName}"
                                    }
                                }
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
            &[
                "Nodes",
                "n1",
                "Group:outer",
                "Group:inner",
                "Components",
                "web",
                "EnvironmentVariables",
                "ID"
            ]
        ),
        &Value::from("n1-inner-web")
    );
}

#[test]
fn test_component_from_whole_string_template() {
    let tree = resolved(
        r#"{
            "svc@template": {"ComponentName": "echo", "EnvironmentVariables": {"PORT": 80}},
            "Nodes": {"n1": {"Group:svc": {"Components": {"web": "@use:svc"}}}}
        }"#,
    );
    assert_eq!(
        keys_at(&tree, COMPONENT),
        vec!["ComponentName", "EnvironmentVariables", "ComponentDescriptionName"]
    );
}

#[test]
fn test_node_cannot_hold_components_directly() {
    let err = resolve(
        r#"{"Nodes": {"n1": {"Components": {"web": {"ComponentName": "echo", "EnvironmentVariables": {}}}}}}"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(&["Nodes", "n1"])));
}

#[test]
fn test_templated_node_cannot_hold_components_directly() {
    let err = resolve(
        r#"{
            "n@template": {
                "Components": {"web": {"ComponentName": "echo", "EnvironmentVariables": {}}}
            },
            "Nodes": {"node1": "@use:n"}
        }"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(&["Nodes", "node1"])));
}

#[test]
fn test_templates_must_not_carry_identity_fields() {
    let err = resolve(
        r#"{"t@template": {"NodeName": "other"}, "Nodes": {"node1": "@use:t"}}"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(&["Nodes", "node1"])));

    let err = resolve(
        r#"{
            "web@template": {
                "ComponentName": "echo",
                "EnvironmentVariables": {},
                "ComponentDescriptionName": "api"
            },
            "Nodes": {"n1": {"Group:svc": {"Components": {"web": "@use:web"}}}}
        }"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(COMPONENT)));
}

#[test]
fn test_group_name_must_not_be_empty() {
    let err = resolve(r#"{"Nodes": {"n1": {"Group:": {}}}}"#).unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(&["Nodes", "n1", "Group:"])));
}

#[test]
fn test_identity_fields_must_not_be_authored() {
    let err = resolve(r#"{"Nodes": {"n1": {"NodeName": "other"}}}"#).unwrap_err();
    assert!(err.is_structural());

    let err = resolve(r#"{"Nodes": {"n1": {"Group:g": {"GroupName": "g"}}}}"#).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn test_component_requires_name_and_environment() {
    let err = resolve(
        r#"{"Nodes": {"n1": {"Group:svc": {"Components": {"web": {"EnvironmentVariables": {}}}}}}}"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(COMPONENT)));
    assert!(err.to_string().contains("ComponentName"));

    let err = resolve(
        r#"{"Nodes": {"n1": {"Group:svc": {"Components": {"web": {"ComponentName": "echo"}}}}}}"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
    assert!(err.to_string().contains("EnvironmentVariables"));
}

#[test]
fn test_structural_entries_must_be_maps() {
    let err = resolve(r#"{"Nodes": {"n1": 5}}"#).unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.address(), Some(&at(&["Nodes", "n1"])));
}
