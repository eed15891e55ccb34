//! Read-only views of a resolved description for deployers.
//!
//! Deployers need, for every component, where it runs and what it is called,
//! plus its environment as plain strings. [`components`] and [`databases`]
//! derive those from a resolved (and usually cleaned) tree.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    Result,
    constants::{
        COMPONENT_DESCRIPTION_NAME, COMPONENT_NAME, DATABASE, DATABASE_HOST, DATABASE_PORT,
        ENVIRONMENT_VARIABLES, VERSION,
    },
    directive::{group_name, is_template_definition},
    resolve::ResolveError,
    scope::{ancestor_group_names, deployment_id, is_component_entry, is_group_entry, parent_node},
    tree::{Address, Value},
};

/// A component as deployers see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentView {
    #[serde(skip)]
    pub address: Address,
    /// Slash-joined semantic path, e.g. `node1/svc/web`
    pub deployment_id: String,
    pub node_name: Option<String>,
    /// Enclosing group names, innermost first
    pub group_names: Vec<String>,
    pub description_name: String,
    pub component_name: String,
    /// The component's `Version`, or the description's when it has none
    pub version: Option<String>,
    /// Environment variables; non-string values are JSON-encoded
    pub environment: BTreeMap<String, String>,
}

/// A group's database as deployers see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseView {
    #[serde(skip)]
    pub group: Address,
    pub group_name: String,
    pub host: Option<String>,
    pub port: Option<i64>,
}

/// Calls `visit` for every map entry in document order, skipping template
/// definitions.
fn for_each_entry<'a>(
    value: &'a Value,
    address: &Address,
    visit: &mut impl FnMut(&Address, &'a Value) -> Result<()>,
) -> Result<()> {
    match value {
        Value::Map(map) => {
            for (key, child) in map.iter() {
                if is_template_definition(key) {
                    continue;
                }
                let entry = address.child(key);
                visit(&entry, child)?;
                for_each_entry(child, &entry, visit)?;
            }
        }
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                for_each_entry(item, &address.child(index), visit)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        other => Some(other.to_display_string()),
    }
}

fn flatten(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        other => other.to_json_string(),
    }
}

/// All components of a resolved tree, in document order.
///
/// # Errors
/// [`ResolveError::StructuralValidation`] if a component is not a map, has
/// no `ComponentName`, or has environment variables that are not a map.
pub fn components(tree: &Value) -> Result<Vec<ComponentView>> {
    let root_version = tree.as_map().and_then(|root| text_field(root.get(VERSION)));
    let mut views = Vec::new();

    for_each_entry(tree, &Address::root(), &mut |address, value| {
        if !is_component_entry(address) {
            return Ok(());
        }
        let Value::Map(component) = value else {
            return Err(ResolveError::structural(address, "a component must be a map").into());
        };
        let component_name = text_field(component.get(COMPONENT_NAME)).ok_or_else(|| {
            ResolveError::structural(address, format!("component is missing '{COMPONENT_NAME}'"))
        })?;
        let environment = match component.get(ENVIRONMENT_VARIABLES) {
            None => BTreeMap::new(),
            Some(Value::Map(env)) => env
                .iter()
                .map(|(key, value)| (key.to_string(), flatten(value)))
                .collect(),
            Some(other) => {
                return Err(ResolveError::structural(
                    address,
                    format!("'{ENVIRONMENT_VARIABLES}' must be a map, found {}", other.type_name()),
                )
                .into());
            }
        };
        let description_name = text_field(component.get(COMPONENT_DESCRIPTION_NAME))
            .or_else(|| address.last_key().map(str::to_string))
            .unwrap_or_default();

        views.push(ComponentView {
            address: address.clone(),
            deployment_id: deployment_id(address),
            node_name: parent_node(address)
                .as_ref()
                .and_then(Address::last_key)
                .map(str::to_string),
            group_names: ancestor_group_names(address),
            description_name,
            component_name,
            version: text_field(component.get(VERSION)).or_else(|| root_version.clone()),
            environment,
        });
        Ok(())
    })?;
    Ok(views)
}

/// All group databases of a resolved tree, in document order.
pub fn databases(tree: &Value) -> Result<Vec<DatabaseView>> {
    let mut views = Vec::new();
    for_each_entry(tree, &Address::root(), &mut |address, value| {
        if !is_group_entry(address) {
            return Ok(());
        }
        let Some(Value::Map(database)) = value.as_map().and_then(|group| group.get(DATABASE))
        else {
            return Ok(());
        };
        let port = match database.get(DATABASE_PORT) {
            Some(Value::Int(port)) => Some(*port),
            Some(Value::Text(port)) => port.trim().parse().ok(),
            _ => None,
        };
        views.push(DatabaseView {
            group: address.clone(),
            group_name: address
                .last_key()
                .and_then(group_name)
                .unwrap_or_default()
                .to_string(),
            host: text_field(database.get(DATABASE_HOST)),
            port,
        });
        Ok(())
    })?;
    Ok(views)
}
