//! Position helpers over the node/group/component structure.
//!
//! These functions only look at an address, never at tree contents. A node
//! is any entry directly under [`NODES`] and a component any entry directly
//! under [`COMPONENTS`]. A group is any entry whose key starts with
//! [`GROUP_PREFIX`](crate::constants::GROUP_PREFIX). Sequence indices are
//! transparent.

use crate::{
    constants::{COMPONENTS, ENVIRONMENT_VARIABLES, NODES},
    directive::group_name,
    tree::{Address, Step},
};

/// Key of the map directly holding the entry at `address`.
fn container_key(address: &Address) -> Option<&str> {
    match address.steps() {
        [.., Step::Key(container), Step::Key(_)] => Some(container.as_str()),
        _ => None,
    }
}

/// An entry directly under [`NODES`].
pub(crate) fn is_node_entry(address: &Address) -> bool {
    container_key(address) == Some(NODES)
}

/// An entry whose key starts with [`GROUP_PREFIX`](crate::constants::GROUP_PREFIX).
pub(crate) fn is_group_entry(address: &Address) -> bool {
    address.last_key().is_some_and(|key| group_name(key).is_some())
}

/// An entry directly under [`COMPONENTS`].
pub(crate) fn is_component_entry(address: &Address) -> bool {
    container_key(address) == Some(COMPONENTS)
}

/// Ancestors of `address` (itself included, trailing indices stripped),
/// innermost first.
fn ancestors(address: &Address) -> impl Iterator<Item = Address> + '_ {
    let start = address.strip_indices();
    (1..=start.len()).rev().map(move |len| start.prefix(len))
}

/// Address of the node enclosing `address`, or the node itself.
pub fn parent_node(address: &Address) -> Option<Address> {
    ancestors(address).find(is_node_entry)
}

/// Address of the innermost group enclosing `address`, or the group itself.
pub fn parent_component_group(address: &Address) -> Option<Address> {
    ancestors(address).find(is_group_entry)
}

/// Address of the outermost group enclosing `address` within its node.
///
/// This is the group whose generated artifacts aggregate every nested group
/// and component below it.
pub fn main_parent_component_group(address: &Address) -> Option<Address> {
    let mut outermost = None;
    for ancestor in ancestors(address) {
        if is_node_entry(&ancestor) {
            break;
        }
        if is_group_entry(&ancestor) {
            outermost = Some(ancestor);
        }
    }
    outermost
}

/// Names of the groups enclosing `address`, innermost first.
pub fn ancestor_group_names(address: &Address) -> Vec<String> {
    ancestors(address)
        .filter_map(|ancestor| {
            ancestor
                .last_key()
                .and_then(group_name)
                .map(str::to_string)
        })
        .collect()
}

/// Semantic names along `address`: container keys and indices are dropped,
/// group keys are reduced to their group name.
///
/// ```
/// # use blueprint::{Address, scope::deployment_path};
/// let address = Address::from_keys([
///     "Nodes", "node1", "Group:svc", "Components", "web", "EnvironmentVariables", "PORT",
/// ]);
/// assert_eq!(deployment_path(&address), vec!["node1", "svc", "web", "PORT"]);
/// ```
pub fn deployment_path(address: &Address) -> Vec<String> {
    address
        .steps()
        .iter()
        .filter_map(|step| match step {
            Step::Key(key) if key == NODES || key == COMPONENTS || key == ENVIRONMENT_VARIABLES => {
                None
            }
            Step::Key(key) => Some(group_name(key).unwrap_or(key).to_string()),
            Step::Index(_) => None,
        })
        .collect()
}

/// Slash-joined [`deployment_path`], used as a human-readable identifier.
pub fn deployment_id(address: &Address) -> String {
    deployment_path(address).join("/")
}
