//! Stripping authoring vocabulary from resolved descriptions.
//!
//! After resolution a description still carries the helper entries authors
//! used to build it: root-level variables, leftover template definitions,
//! settings on groups that only existed to be referenced. The [`Cleaner`]
//! removes them so deployers only see the manifest vocabulary.
//!
//! At the root, inside nodes, inside groups and inside components, any key
//! that is not part of the vocabulary at that level is deleted. Template
//! definitions are deleted wherever they are. Auxiliary sections (`Logging`,
//! `Docker` and `Deployment` by default) are kept verbatim and never
//! descended into. Leaves are never modified, so cleaning twice gives the
//! same tree as cleaning once.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    constants::{
        COMPONENT_DESCRIPTION_NAME, COMPONENT_NAME, COMPONENTS, DATABASE,
        DEFAULT_AUXILIARY_SECTIONS, ENVIRONMENT_VARIABLES, GROUP_NAME, NODE_NAME, NODES, PROJECT,
        TARGET, VERSION,
    },
    directive::{group_name, is_template_definition},
    scope::{is_component_entry, is_group_entry, is_node_entry},
    tree::{Address, Value},
    walker::{KeyAction, TreeWalker, Visitor},
};

const ROOT_VOCABULARY: &[&str] = &[PROJECT, VERSION, TARGET, NODES];
const NODE_VOCABULARY: &[&str] = &[NODE_NAME];
const GROUP_VOCABULARY: &[&str] = &[GROUP_NAME, COMPONENTS, DATABASE];
const COMPONENT_VOCABULARY: &[&str] = &[
    COMPONENT_NAME,
    COMPONENT_DESCRIPTION_NAME,
    VERSION,
    ENVIRONMENT_VARIABLES,
];

/// Configuration for a [`Cleaner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Sections kept verbatim at any level
    #[serde(default = "default_auxiliary_sections")]
    pub auxiliary_sections: Vec<String>,
}

fn default_auxiliary_sections() -> Vec<String> {
    DEFAULT_AUXILIARY_SECTIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            auxiliary_sections: default_auxiliary_sections(),
        }
    }
}

/// Which vocabulary applies to the keys of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Root,
    Node,
    Group,
    Component,
    /// Free-form content, e.g. environment variables
    Open,
}

impl Boundary {
    fn of(container: &Address) -> Self {
        if container.is_root() {
            Boundary::Root
        } else if is_node_entry(container) {
            Boundary::Node
        } else if is_group_entry(container) {
            Boundary::Group
        } else if is_component_entry(container) {
            Boundary::Component
        } else {
            Boundary::Open
        }
    }

    fn allows(self, key: &str) -> bool {
        match self {
            Boundary::Root => ROOT_VOCABULARY.contains(&key),
            // Groups nest inside nodes and inside other groups
            Boundary::Node => NODE_VOCABULARY.contains(&key) || group_name(key).is_some(),
            Boundary::Group => GROUP_VOCABULARY.contains(&key) || group_name(key).is_some(),
            Boundary::Component => COMPONENT_VOCABULARY.contains(&key),
            Boundary::Open => true,
        }
    }
}

/// Removes everything but manifest vocabulary from a resolved tree.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Cleans `tree` in place, returning the number of deleted entries.
    pub fn clean(&self, tree: &mut Value) -> Result<usize> {
        let mut visitor = CleanVisitor {
            auxiliary_sections: &self.config.auxiliary_sections,
            deleted: 0,
        };
        TreeWalker::default().walk(tree, &mut visitor)?;
        tracing::info!(deleted = visitor.deleted, "Cleaned description");
        Ok(visitor.deleted)
    }
}

struct CleanVisitor<'c> {
    auxiliary_sections: &'c [String],
    deleted: usize,
}

impl Visitor for CleanVisitor<'_> {
    fn on_key_enter(
        &mut self,
        _tree: &mut Value,
        key: &str,
        address: &Address,
    ) -> Result<KeyAction> {
        if is_template_definition(key) {
            tracing::debug!(%address, "Removing template definition");
            self.deleted += 1;
            return Ok(KeyAction::Delete);
        }
        if self.auxiliary_sections.iter().any(|section| section == key) {
            return Ok(KeyAction::Skip);
        }

        let container = address.parent().unwrap_or_else(Address::root);
        if !Boundary::of(&container).allows(key) {
            tracing::debug!(%address, "Removing authoring entry");
            self.deleted += 1;
            return Ok(KeyAction::Delete);
        }
        Ok(KeyAction::Keep(key.to_string()))
    }
}
