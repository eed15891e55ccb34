//! Resolver configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_RANGE_LEN, DEFAULT_MAX_REWALKS};

/// Bounds and optional collaborators for a [`super::Resolver`].
///
/// Every field has a default, so a partial configuration file is enough:
///
/// ```
/// # use blueprint::resolve::ResolverConfig;
/// let config: ResolverConfig = serde_json::from_str(r#"{"max_iterations": 4}"#)?;
/// assert_eq!(config.max_iterations, 4);
/// assert_eq!(config.max_rewalks, 100);
/// assert!(config.component_config_dir.is_none());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Bound on each substitution pass over one string
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Bound on re-visiting a leaf that keeps changing
    #[serde(default = "default_max_rewalks")]
    pub max_rewalks: usize,
    /// Directory of per-component default-parameter catalogues.
    /// The cross-check is skipped when unset.
    #[serde(default)]
    pub component_config_dir: Option<PathBuf>,
    /// Largest sequence `range()` may build inside expressions
    #[serde(default = "default_max_range_len")]
    pub max_range_len: usize,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_max_rewalks() -> usize {
    DEFAULT_MAX_REWALKS
}

fn default_max_range_len() -> usize {
    DEFAULT_MAX_RANGE_LEN
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_rewalks: DEFAULT_MAX_REWALKS,
            component_config_dir: None,
            max_range_len: DEFAULT_MAX_RANGE_LEN,
        }
    }
}

impl ResolverConfig {
    pub fn with_component_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.component_config_dir = Some(dir.into());
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}
