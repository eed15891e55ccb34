//! Complete descriptions taken through load, resolve, clean and save.

use blueprint::{
    Value,
    clean::Cleaner,
    manifest,
    resolve::{Resolver, ResolverConfig},
    tree,
};

use crate::helpers::{doc, get, resolved};

#[test]
fn test_minimal_description() {
    let mut tree = resolved(
        r#"{
            "basePort": 8080,
            "Nodes": {
                "node1": {
                    "Group:svc": {
                        "Components": {
                            "component": {
                                "ComponentName": "echo",
                                "EnvironmentVariables": {"port": "${basePort}"}
                            }
                        }
                    }
                }
            }
        }"#,
    );
    Cleaner::default().clean(&mut tree).unwrap();

    assert_eq!(
        tree::to_pretty_string(&tree).unwrap(),
        r#"{
    "Nodes": {
        "node1": {
            "Group:svc": {
                "Components": {
                    "component": {
                        "ComponentName": "echo",
                        "EnvironmentVariables": {
                            "port": 8080
                        },
                        "ComponentDescriptionName": "component"
                    }
                },
                "GroupName": "svc"
            },
            "NodeName": "node1"
        }
    }
}
"#
    );
}

const DEPLOYMENT: &str = r#"{
    // Shared settings
    "Project": "shop",
    "Version": "1.4.0",
    "Env": "prod",
    "basePort": 9000,

    "service@template": {
        "ComponentName": "http-echo",
        "EnvironmentVariables": {
            "PORT": "<<basePort = basePort + 1>>",
            "NAME": "${NodeName}.${ComponentDescriptionName}",
            "LOG_LEVEL": "info"
        }
    },

    "Logging": {"driver": "${Env}-syslog"},

    "Nodes": {
        "edge": {
            "Group:frontend": {
                "Components": {
                    "web##a@use:service": {},
                    "debug@use:service@if:'${Env}' == 'dev'": {},
                    "api@use:service": {
                        "EnvironmentVariables": {"LOG_LEVEL": "warn", "~LEGACY": 1}
                    }
                }
            }
        },
        "data": {
            "Group:db": {
                "Database": {"Host": "${NodeName}", "Port": 5432},
                "Components": {
                    "pg": {
                        "ComponentName": "postgres",
                        "EnvironmentVariables": {
                            "PGPORT": "${Port}",
                            "REPLICAS": "$<len([${basePort}, 1])>"
                        }
                    }
                },
                "notes": "removed by the cleaner"
            }
        }
    }
}"#;

fn frontend_env<'a>(component: &'a str, variable: &'a str) -> [&'a str; 7] {
    [
        "Nodes",
        "edge",
        "Group:frontend",
        "Components",
        component,
        "EnvironmentVariables",
        variable,
    ]
}

#[test]
fn test_full_pipeline_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("deployment.json");
    let target = dir.path().join("resolved.json");
    std::fs::write(&source, DEPLOYMENT).unwrap();

    let mut tree = tree::load(&source).unwrap();
    let report = Resolver::new(ResolverConfig::default())
        .resolve(&mut tree)
        .unwrap();
    assert_eq!(report.components, 3);
    assert_eq!(report.templates_applied, 2);

    // Each use of the template advances the shared counter
    assert_eq!(get(&tree, &frontend_env("web", "PORT")), &Value::Int(9001));
    assert_eq!(get(&tree, &frontend_env("api", "PORT")), &Value::Int(9002));
    assert_eq!(get(&tree, &["basePort"]), &Value::Int(9002));
    assert_eq!(get(&tree, &frontend_env("web", "NAME")), &Value::from("edge.web"));
    assert_eq!(get(&tree, &["Logging", "driver"]), &Value::from("prod-syslog"));

    Cleaner::default().clean(&mut tree).unwrap();
    tree::save(&target, &tree).unwrap();
    let cleaned = tree::load(&target).unwrap();

    assert_eq!(
        get(&cleaned, &["Nodes", "edge", "Group:frontend", "Components", "api"]),
        &doc(
            r#"{
                "ComponentName": "http-echo",
                "EnvironmentVariables": {"PORT": 9002, "NAME": "edge.api", "LOG_LEVEL": "warn"},
                "ComponentDescriptionName": "api"
            }"#
        )
    );
    // Auxiliary sections survive cleaning, authoring helpers do not
    assert_eq!(get(&cleaned, &["Logging"]), &doc(r#"{"driver": "prod-syslog"}"#));
    assert!(cleaned.as_map().unwrap().get("basePort").is_none());
    assert!(cleaned.as_map().unwrap().get("service@template").is_none());

    let components = manifest::components(&cleaned).unwrap();
    let ids: Vec<_> = components.iter().map(|c| c.deployment_id.as_str()).collect();
    assert_eq!(ids, vec!["edge/frontend/web", "edge/frontend/api", "data/db/pg"]);
    assert!(components.iter().all(|c| c.version.as_deref() == Some("1.4.0")));

    let pg = &components[2];
    assert_eq!(pg.environment["PGPORT"], "5432");
    assert_eq!(pg.environment["REPLICAS"], "2");

    let databases = manifest::databases(&cleaned).unwrap();
    assert_eq!(databases.len(), 1);
    assert_eq!(databases[0].group_name, "db");
    assert_eq!(databases[0].host.as_deref(), Some("data"));
    assert_eq!(databases[0].port, Some(5432));
}
