//! Constants used throughout the Blueprint library.
//!
//! This module provides central definitions for the vocabulary of deployment
//! descriptions: container keys, identity fields injected during resolution,
//! and the directive tokens authors attach to map keys.

/// Root key holding one entry per node.
pub const NODES: &str = "Nodes";

/// Prefix marking a component group key, e.g. `Group:backend`.
pub const GROUP_PREFIX: &str = "Group:";

/// Key holding one entry per component inside a group.
pub const COMPONENTS: &str = "Components";

/// Key holding a component's environment variables.
pub const ENVIRONMENT_VARIABLES: &str = "EnvironmentVariables";

/// Optional database owned by a component group.
pub const DATABASE: &str = "Database";
pub const DATABASE_HOST: &str = "Host";
pub const DATABASE_PORT: &str = "Port";

// Root metadata
pub const PROJECT: &str = "Project";
pub const VERSION: &str = "Version";
pub const TARGET: &str = "Target";

/// Mandatory component field naming the packaged component.
pub const COMPONENT_NAME: &str = "ComponentName";

// Identity fields injected exactly once during resolution
pub const NODE_NAME: &str = "NodeName";
pub const GROUP_NAME: &str = "GroupName";
pub const COMPONENT_DESCRIPTION_NAME: &str = "ComponentDescriptionName";

/// Key prefix removing the entry from the resolved tree.
pub const DELETE_PREFIX: &str = "~";

/// Marker letting authors repeat otherwise identical keys; `##` and the word
/// that follows it are stripped.
pub const DISAMBIGUATION_MARKER: &str = "##";

/// Key marker for template definitions, e.g. `service@template`.
pub const TEMPLATE_DEFINITION_MARKER: &str = "@template";

/// Key marker introducing a presence test, e.g. `debug@if:${Env} == 'dev'`.
pub const PRESENCE_TEST_MARKER: &str = "@if:";

/// Marker instantiating a template, in keys (`web@use:service`) or as a whole
/// string value (`"@use:service"`).
pub const TEMPLATE_USE_MARKER: &str = "@use:";

/// Sections the cleaner hands over to collaborators untouched.
pub const DEFAULT_AUXILIARY_SECTIONS: &[&str] = &["Logging", "Docker", "Deployment"];

/// Bound on each fixed-point substitution loop.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Bound on re-walking a leaf that keeps changing.
pub const DEFAULT_MAX_REWALKS: usize = 100;

/// Largest sequence `range()` may produce.
pub const DEFAULT_MAX_RANGE_LEN: usize = 100_000;

/// Most items (list elements, string characters) one expression may build
/// in total, nested comprehensions included.
pub const DEFAULT_MAX_EVAL_ITEMS: usize = 1_000_000;

/// File name of a component's default-parameter catalogue.
pub const CATALOGUE_FILE: &str = "defaults.json";
