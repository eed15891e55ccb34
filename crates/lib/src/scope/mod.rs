//! Lexical scoping over description trees.
//!
//! References (`${name}`) and template names are looked up through a
//! [`ScopeChain`]: starting at the referencing entry and moving outwards,
//! each enclosing map is a scope. In every scope the map's own entries are
//! visible, and so is everything nested inside the siblings declared
//! *before* the entry the search came from. Siblings declared later, and the
//! subtree the search came from, are not searched, so a description cannot
//! refer forward into a later sibling.
//!
//! Deployment paths (`group/component/VAR`) address entries by their
//! semantic names instead; see [`ScopeChain::find_by_path`].

pub mod path;

pub use path::{
    ancestor_group_names, deployment_id, deployment_path, main_parent_component_group,
    parent_component_group, parent_node,
};
pub(crate) use path::{is_component_entry, is_group_entry, is_node_entry};

use crate::{
    constants::{COMPONENTS, ENVIRONMENT_VARIABLES, GROUP_PREFIX, NODES},
    directive::is_template_definition,
    resolve::ResolveError,
    tree::{Address, Step, Value},
};

/// One scope of a [`ScopeChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeLevel {
    /// The map forming this scope
    pub address: Address,
    /// Key of the entry the search came from; siblings before it are searched
    pub descended_from: Option<String>,
}

/// A successful scope or path lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<'a> {
    pub value: &'a Value,
    pub address: Address,
    /// Address of the map holding the found entry
    pub container: Address,
}

/// Scope-aware lookups over one tree snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'a> {
    tree: &'a Value,
}

impl<'a> ScopeChain<'a> {
    pub fn new(tree: &'a Value) -> Self {
        Self { tree }
    }

    /// The scopes searched for a reference made at `address`, innermost
    /// first.
    ///
    /// Every map-valued ancestor is a scope; a sequence between two maps is
    /// passed through without forming a scope of its own.
    pub fn candidates(&self, address: &Address) -> Vec<ScopeLevel> {
        let steps = address.steps();
        let mut levels = vec![ScopeLevel {
            address: address.strip_indices(),
            descended_from: None,
        }];
        for len in (0..steps.len()).rev() {
            if let Step::Key(key) = &steps[len] {
                levels.push(ScopeLevel {
                    address: address.prefix(len),
                    descended_from: Some(key.clone()),
                });
            }
        }
        levels.dedup_by(|later, earlier| later.address == earlier.address);
        levels
    }

    /// Finds the entry called `name` visible from `address`.
    pub fn find_visible(&self, name: &str, address: &Address) -> Option<Found<'a>> {
        for level in self.candidates(address) {
            let Ok(Value::Map(map)) = self.tree.read(&level.address) else {
                continue;
            };
            if let Some(value) = map.get(name) {
                return Some(Found {
                    value,
                    address: level.address.child(name),
                    container: level.address.clone(),
                });
            }
            let Some(from) = &level.descended_from else {
                continue;
            };
            for (key, sibling) in map.iter() {
                if key == from {
                    break;
                }
                if is_template_definition(key) {
                    continue;
                }
                if let Some(found) = search_subtree(sibling, name, level.address.child(key)) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Resolves a slash-separated deployment path seen from `address`.
    ///
    /// The first segment is looked up through the scope chain, literally and
    /// then as a group name. Each following segment must name a direct child
    /// (again literally or as a group), possibly inside a node, component or
    /// environment-variable container that is entered transparently.
    ///
    /// ```
    /// # use blueprint::{Address, scope::ScopeChain, tree};
    /// let doc = tree::parse_commented(r#"{"Group:db": {"Components": {"pg": {
    ///     "EnvironmentVariables": {"PORT": 5432}}}}, "app": "x"}"#)?;
    /// let found = ScopeChain::new(&doc).find_by_path("db/pg/PORT", &Address::from_keys(["app"]))?;
    /// assert_eq!(found.value, &tree::Value::Int(5432));
    /// # Ok::<(), blueprint::Error>(())
    /// ```
    pub fn find_by_path(&self, path: &str, address: &Address) -> Result<Found<'a>, ResolveError> {
        let not_found = || ResolveError::ReferenceNotFound {
            reference: path.to_string(),
            address: address.clone(),
        };
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next().ok_or_else(not_found)?;

        let mut found = self
            .find_visible(first, address)
            .or_else(|| self.find_visible(&format!("{GROUP_PREFIX}{first}"), address))
            .ok_or_else(not_found)?;

        for segment in segments {
            found = self.step_segment(&found.address, segment).ok_or_else(not_found)?;
        }
        Ok(found)
    }

    fn step_segment(&self, current: &Address, segment: &str) -> Option<Found<'a>> {
        let Ok(Value::Map(map)) = self.tree.read(current) else {
            return None;
        };
        let group_key = format!("{GROUP_PREFIX}{segment}");
        for key in [segment, group_key.as_str()] {
            if let Some(value) = map.get(key) {
                return Some(Found {
                    value,
                    address: current.child(key),
                    container: current.clone(),
                });
            }
        }
        for container in [NODES, COMPONENTS, ENVIRONMENT_VARIABLES] {
            if let Some(Value::Map(inner)) = map.get(container)
                && let Some(value) = inner.get(segment)
            {
                let container = current.child(container);
                return Some(Found {
                    value,
                    address: container.child(segment),
                    container,
                });
            }
        }
        None
    }

    /// Finds a template definition called `name` visible from `address`.
    pub fn find_template(&self, name: &str, address: &Address) -> Option<Found<'a>> {
        self.find_visible(
            &format!("{name}{}", crate::constants::TEMPLATE_DEFINITION_MARKER),
            address,
        )
    }
}

/// Depth-first, document-order search for a key called `name`.
fn search_subtree<'a>(value: &'a Value, name: &str, address: Address) -> Option<Found<'a>> {
    match value {
        Value::Map(map) => {
            for (key, child) in map.iter() {
                if key == name {
                    return Some(Found {
                        value: child,
                        address: address.child(key),
                        container: address,
                    });
                }
                if is_template_definition(key) {
                    continue;
                }
                if let Some(found) = search_subtree(child, name, address.child(key)) {
                    return Some(found);
                }
            }
            None
        }
        Value::Sequence(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, item)| search_subtree(item, name, address.child(index))),
        _ => None,
    }
}
