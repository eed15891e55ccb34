//! Resolution of deployment descriptions.
//!
//! [`Resolver::resolve`] runs a single [`TreeWalker`] pass that turns an
//! authored description into a concrete one, mutating it in place.
//!
//! On entering each map key, in order:
//!
//! 1. `~key` deletes the entry.
//! 2. `##word` disambiguation markers are stripped from the key.
//! 3. `name@template` entries are left alone; templates are only resolved
//!    where they are used.
//! 4. `key@if:<expr>` keeps the entry (without the test) only if the
//!    expression evaluates to `True`.
//! 5. References in the key itself are substituted.
//! 6. `key@use:<template>` replaces the value with a copy of the template,
//!    with the authored value deep-merged over it.
//! 7. Nodes, groups and components are checked and receive their identity
//!    fields (`NodeName`, `GroupName`, `ComponentDescriptionName`).
//!
//! On each scalar leaf, a `"@use:<template>"` string is replaced by a copy
//! of the template; any other string goes through reference substitution
//! (see the `references` passes) and is coerced to a number or boolean when
//! the result reads as one.
//!
//! Resolution is fail-fast. On error the tree is left partially resolved and
//! must be reloaded before retrying.

pub mod catalogue;
pub mod config;
pub mod errors;
mod references;
mod template;

use std::{collections::HashSet, path::Path};

pub use catalogue::{Catalogue, Finding, FindingKind, Severity};
pub use config::ResolverConfig;
pub use errors::ResolveError;
pub use template::deep_merge;

use crate::{
    Result,
    constants::{
        COMPONENT_DESCRIPTION_NAME, COMPONENT_NAME, COMPONENTS, ENVIRONMENT_VARIABLES,
        GROUP_NAME, NODE_NAME, TEMPLATE_USE_MARKER,
    },
    directive::{KeyDirectives, group_name, template_use_value},
    expr::{EvalValue, Evaluator},
    scope::{deployment_id, is_component_entry, is_node_entry},
    tree::{Address, Map, Value},
    walker::{KeyAction, TreeWalker, Visitor},
};
use references::References;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    /// Default-parameter cross-check results
    pub findings: Vec<Finding>,
    pub templates_applied: usize,
    pub entries_deleted: usize,
    pub components: usize,
}

impl ResolveReport {
    /// Returns `true` if any finding has error severity.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity() == Severity::Warning)
    }
}

/// Resolves descriptions in place.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `tree` in place.
    ///
    /// # Errors
    /// Any unresolvable reference or template, failing expression, loop that
    /// does not settle, or structural violation aborts resolution.
    pub fn resolve(&self, tree: &mut Value) -> Result<ResolveReport> {
        let mut visitor = ResolveVisitor {
            references: References::new(
                self.config.max_iterations,
                Evaluator::new(self.config.max_range_len),
            ),
            catalogue_dir: self.config.component_config_dir.as_deref(),
            max_expansion_depth: self.config.max_iterations,
            expansions: Vec::new(),
            injected: HashSet::new(),
            report: ResolveReport::default(),
        };
        TreeWalker::new(self.config.max_rewalks).walk(tree, &mut visitor)?;

        let report = visitor.report;
        tracing::info!(
            components = report.components,
            templates = report.templates_applied,
            deleted = report.entries_deleted,
            warnings = report.warnings().count(),
            errors = report.errors().count(),
            "Resolved description"
        );
        Ok(report)
    }
}

/// Role of a map entry in the node/group/component structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role<'k> {
    Node,
    Group(&'k str),
    Component,
    Other,
}

impl<'k> Role<'k> {
    fn of(key: &'k str, entry: &Address) -> Self {
        if is_node_entry(entry) {
            Role::Node
        } else if let Some(name) = group_name(key) {
            Role::Group(name)
        } else if is_component_entry(entry) {
            Role::Component
        } else {
            Role::Other
        }
    }

    fn identity(self, key: &'k str) -> Option<(&'static str, &'k str)> {
        match self {
            Role::Node => Some((NODE_NAME, key)),
            Role::Group(name) => Some((GROUP_NAME, name)),
            Role::Component => Some((COMPONENT_DESCRIPTION_NAME, key)),
            Role::Other => None,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Role::Node => "node",
            Role::Group(_) => "group",
            Role::Component => "component",
            Role::Other => "entry",
        }
    }
}

struct ResolveVisitor<'c> {
    references: References,
    catalogue_dir: Option<&'c Path>,
    max_expansion_depth: usize,
    /// Addresses where templates were instantiated
    expansions: Vec<Address>,
    /// Entries whose identity field was added on key enter
    injected: HashSet<Address>,
    report: ResolveReport,
}

/// Rules a node, group or component map must meet before its identity field
/// is added.
fn check_identity_shape(entry: &Address, role: Role, field: &str, map: &Map) -> Result<()> {
    if role == Role::Node && map.contains_key(COMPONENTS) {
        return Err(ResolveError::structural(
            entry,
            format!("a node cannot hold '{COMPONENTS}' directly; wrap them in a group"),
        )
        .into());
    }
    if map.contains_key(field) {
        return Err(ResolveError::structural(
            entry,
            format!("'{field}' is set during resolution and must not be written"),
        )
        .into());
    }
    Ok(())
}

impl ResolveVisitor<'_> {
    fn presence_test(&self, tree: &mut Value, test: &str, address: &Address) -> Result<bool> {
        let expression = self.references.substitute(tree, test, address)?;
        let outcome = self
            .references
            .evaluator()
            .evaluate(&expression)
            .map_err(|source| ResolveError::ExpressionEvaluationFailure {
                expression: expression.clone(),
                address: address.clone(),
                source,
            })?;
        Ok(outcome == EvalValue::Bool(true))
    }

    /// Instantiates `name` for the entry that will live at `entry`, looking
    /// the template up from `lookup_at`. Guards against templates that keep
    /// expanding into themselves.
    fn expand(
        &mut self,
        tree: &mut Value,
        name: &str,
        lookup_at: &Address,
        entry: &Address,
        site: Option<Value>,
    ) -> Result<Value> {
        let depth = self
            .expansions
            .iter()
            .filter(|earlier| entry.starts_with(earlier))
            .count();
        if depth >= self.max_expansion_depth {
            return Err(ResolveError::LoopBoundExceeded {
                stage: "Template expansion",
                limit: self.max_expansion_depth,
                address: entry.clone(),
            }
            .into());
        }

        let name = self.references.substitute(tree, name.trim(), lookup_at)?;
        let value = template::instantiate(tree, &name, lookup_at, site)?;
        self.expansions.push(entry.clone());
        self.report.templates_applied += 1;
        Ok(value)
    }

    fn inject_identity(&mut self, tree: &mut Value, entry: &Address, key: &str) -> Result<()> {
        let role = Role::of(key, entry);
        if let Role::Group("") = role {
            return Err(ResolveError::structural(entry, "group key has an empty name").into());
        }
        let Some((field, name)) = role.identity(key) else {
            return Ok(());
        };
        // A leaf may still turn into a map once its template is applied
        let Some(map) = tree.read_mut(entry)?.as_map_mut() else {
            return Ok(());
        };
        check_identity_shape(entry, role, field, map)?;
        tracing::debug!(address = %entry, field, name, "Injecting identity field");
        map.insert(field, name);
        self.injected.insert(entry.clone());
        Ok(())
    }

    fn check_resolved(&mut self, tree: &mut Value, entry: &Address, key: &str) -> Result<()> {
        let role = Role::of(key, entry);
        let Some((field, name)) = role.identity(key) else {
            return Ok(());
        };
        let Some(map) = tree.read_mut(entry)?.as_map_mut() else {
            return Err(
                ResolveError::structural(entry, format!("a {} must be a map", role.describe()))
                    .into(),
            );
        };
        // Entries that only became maps through a template get the same
        // checks on the way out
        if !self.injected.remove(entry) {
            check_identity_shape(entry, role, field, map)?;
            tracing::debug!(address = %entry, field, name, "Injecting identity field");
            map.insert(field, name);
        }
        if role != Role::Component {
            return Ok(());
        }

        for required in [COMPONENT_NAME, ENVIRONMENT_VARIABLES] {
            if !map.contains_key(required) {
                return Err(ResolveError::structural(
                    entry,
                    format!("component is missing '{required}'"),
                )
                .into());
            }
        }
        self.report.components += 1;

        if let Some(dir) = self.catalogue_dir {
            let component_name = map
                .get(COMPONENT_NAME)
                .map(Value::to_display_string)
                .unwrap_or_default();
            let environment = match map.get(ENVIRONMENT_VARIABLES) {
                Some(Value::Map(env)) => env.clone(),
                _ => Default::default(),
            };
            let findings =
                catalogue::cross_check(dir, &deployment_id(entry), &component_name, &environment);
            self.report.findings.extend(findings);
        }
        Ok(())
    }
}

impl Visitor for ResolveVisitor<'_> {
    fn on_key_enter(
        &mut self,
        tree: &mut Value,
        key: &str,
        address: &Address,
    ) -> Result<KeyAction> {
        let directives = KeyDirectives::parse(key);

        if directives.delete {
            tracing::debug!(%address, "Deleting entry");
            self.report.entries_deleted += 1;
            return Ok(KeyAction::Delete);
        }

        if directives.template_definition {
            if directives.disambiguated {
                tree.rename_last_key(address, &directives.key, None)?;
            }
            return Ok(KeyAction::Skip);
        }

        let mut new_key = directives.key.clone();
        if let Some(test) = &directives.presence_test {
            if !self.presence_test(tree, test, address)? {
                tracing::debug!(%address, test, "Presence test failed, deleting entry");
                self.report.entries_deleted += 1;
                return Ok(KeyAction::Delete);
            }
            new_key = directives.without_presence_test().to_string();
        }

        new_key = self.references.substitute(tree, &new_key, address)?;

        let mut new_value = None;
        if let Some((head, template)) = new_key
            .split_once(TEMPLATE_USE_MARKER)
            .map(|(head, template)| (head.to_string(), template.to_string()))
        {
            let site = tree.read(address)?.clone();
            let entry = address.with_last_key(head.as_str());
            new_value = Some(self.expand(tree, &template, address, &entry, Some(site))?);
            new_key = head;
        }

        if new_key != key || new_value.is_some() {
            tracing::debug!(%address, new_key, "Rewriting key");
            tree.rename_last_key(address, &new_key, new_value)?;
        }

        let entry = address.with_last_key(new_key.as_str());
        self.inject_identity(tree, &entry, &new_key)?;
        Ok(KeyAction::Keep(new_key))
    }

    fn on_key_exit(&mut self, tree: &mut Value, key: &str, address: &Address) -> Result<()> {
        self.check_resolved(tree, address, key)
    }

    fn on_leaf(&mut self, tree: &mut Value, address: &Address) -> Result<bool> {
        let Value::Text(text) = tree.read(address)? else {
            return Ok(false);
        };

        if let Some(template) = template_use_value(text) {
            let template = template.to_string();
            let value = self.expand(tree, &template, address, address, None)?;
            tree.write(address, value)?;
            return Ok(true);
        }

        let text = text.clone();
        match self.references.resolve_text(tree, &text, address)? {
            Some(value) => {
                tracing::trace!(%address, from = %text, to = %value, "Resolved leaf");
                tree.write(address, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
