//! Deployer views over resolved descriptions.

use blueprint::{clean::Cleaner, manifest};

use crate::helpers::{at, resolve, resolved};

fn deployment() -> blueprint::Value {
    let mut tree = resolved(
        r#"{
            "Version": "3.1",
            "Nodes": {
                "n1": {
                    "Group:outer": {
                        "Database": {"Host": "db.${NodeName}", "Port": "6432"},
                        "Group:inner": {
                            "Components": {
                                "web": {
                                    "ComponentName": "echo",
                                    "EnvironmentVariables": {
                                        "PORT": 80,
                                        "HOSTS": ["a", "b"],
                                        "DEBUG": false,
                                        "NAME": "${ComponentDescriptionName}",
                                        "UNSET": null
                                    }
                                }
                            }
                        },
                        "Components": {
                            "worker": {
                                "ComponentName": "queue",
                                "Version": "0.9",
                                "EnvironmentVariables": {}
                            }
                        }
                    }
                }
            }
        }"#,
    );
    Cleaner::default().clean(&mut tree).unwrap();
    tree
}

#[test]
fn test_component_views() {
    let components = manifest::components(&deployment()).unwrap();
    assert_eq!(components.len(), 2);

    let web = &components[0];
    assert_eq!(web.deployment_id, "n1/outer/inner/web");
    assert_eq!(
        web.address,
        at(&["Nodes", "n1", "Group:outer", "Group:inner", "Components", "web"])
    );
    assert_eq!(web.node_name.as_deref(), Some("n1"));
    assert_eq!(web.group_names, vec!["inner", "outer"]);
    assert_eq!(web.description_name, "web");
    assert_eq!(web.component_name, "echo");
    assert_eq!(web.version.as_deref(), Some("3.1"));

    let environment: Vec<_> = web
        .environment
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        environment,
        vec![
            ("DEBUG", "false"),
            ("HOSTS", r#"["a","b"]"#),
            ("NAME", "web"),
            ("PORT", "80"),
            ("UNSET", "null"),
        ]
    );

    let worker = &components[1];
    assert_eq!(worker.deployment_id, "n1/outer/worker");
    assert_eq!(worker.version.as_deref(), Some("0.9"));
}

#[test]
fn test_component_views_serialize_without_addresses() {
    let components = manifest::components(&deployment()).unwrap();
    let json = serde_json::to_value(&components[1]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "deployment_id": "n1/outer/worker",
            "node_name": "n1",
            "group_names": ["outer"],
            "description_name": "worker",
            "component_name": "queue",
            "version": "0.9",
            "environment": {}
        })
    );
}

#[test]
fn test_database_views() {
    let databases = manifest::databases(&deployment()).unwrap();
    assert_eq!(databases.len(), 1);
    assert_eq!(databases[0].group, at(&["Nodes", "n1", "Group:outer"]));
    assert_eq!(databases[0].group_name, "outer");
    assert_eq!(databases[0].host.as_deref(), Some("db.n1"));
    assert_eq!(databases[0].port, Some(6432));
}

#[test]
fn test_template_definitions_are_not_components() {
    let tree = resolved(
        r#"{
            "Nodes": {
                "n1": {
                    "Group:g": {
                        "Components": {
                            "spare@template": {"EnvironmentVariables": {}},
                            "web": {"ComponentName": "echo", "EnvironmentVariables": {}}
                        }
                    }
                }
            }
        }"#,
    );
    let components = manifest::components(&tree).unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].description_name, "web");
}

#[test]
fn test_malformed_component_is_rejected() {
    let tree = blueprint::tree::parse_commented(
        r#"{"Nodes": {"n1": {"Group:g": {"Components": {"web": {"EnvironmentVariables": {}}}}}}}"#,
    )
    .unwrap();
    let err = manifest::components(&tree).unwrap_err();
    assert!(err.is_structural());

    // The resolver rejects the same description
    let err = resolve(
        r#"{"Nodes": {"n1": {"Group:g": {"Components": {"web": {"EnvironmentVariables": {}}}}}}}"#,
    )
    .unwrap_err();
    assert!(err.is_structural());
}
