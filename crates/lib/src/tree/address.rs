//! Addresses into description trees.
//!
//! An [`Address`] is the ordered list of [`Step`]s from the root of a tree to
//! one of its values. Every mutation in this crate goes through an address,
//! so callers never hold aliases into the tree across edits.
//!
//! # Usage
//!
//! ```rust
//! use blueprint::tree::{Address, Step};
//!
//! let address = Address::root().key("Nodes").key("node1").index(0);
//! assert_eq!(address.to_string(), "Nodes/node1/0");
//! assert_eq!(address.last(), Some(&Step::Index(0)));
//! assert_eq!(address.strip_indices().to_string(), "Nodes/node1");
//! ```

use std::fmt;

/// One step of an [`Address`]: a map key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Key(String),
    Index(usize),
}

impl Step {
    /// Returns the key if this step is a map key.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Step::Key(key) => Some(key),
            Step::Index(_) => None,
        }
    }

    /// Name of the container kind this step expects.
    pub fn container_kind(&self) -> &'static str {
        match self {
            Step::Key(_) => "map",
            Step::Index(_) => "sequence",
        }
    }
}

impl From<&str> for Step {
    fn from(key: &str) -> Self {
        Step::Key(key.to_string())
    }
}

impl From<String> for Step {
    fn from(key: String) -> Self {
        Step::Key(key)
    }
}

impl From<usize> for Step {
    fn from(index: usize) -> Self {
        Step::Index(index)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) => write!(f, "{key}"),
            Step::Index(index) => write!(f, "{index}"),
        }
    }
}

/// An owned location in a description tree.
///
/// An address only has meaning relative to a specific tree snapshot: renames
/// and deletions invalidate addresses that pass through the edited key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    steps: Vec<Step>,
}

impl Address {
    /// The address of the tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds an address from a list of steps.
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Builds an address made only of map keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: keys.into_iter().map(|k| Step::Key(k.into())).collect(),
        }
    }

    /// Appends a map key step.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(Step::Key(key.into()));
        self
    }

    /// Appends a sequence index step.
    pub fn index(mut self, index: usize) -> Self {
        self.steps.push(Step::Index(index));
        self
    }

    /// Returns a new address one step below this one.
    pub fn child(&self, step: impl Into<Step>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step.into());
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// The final step when it is a map key.
    pub fn last_key(&self) -> Option<&str> {
        self.last().and_then(Step::as_key)
    }

    /// The address one step up, or `None` at the root.
    pub fn parent(&self) -> Option<Address> {
        if self.steps.is_empty() {
            None
        } else {
            Some(Self {
                steps: self.steps[..self.steps.len() - 1].to_vec(),
            })
        }
    }

    /// The first `len` steps of this address.
    pub fn prefix(&self, len: usize) -> Address {
        Self {
            steps: self.steps[..len.min(self.steps.len())].to_vec(),
        }
    }

    /// Drops trailing sequence-index steps.
    ///
    /// Sequences are transparent to scoping, so scope lookups always start
    /// from the nearest enclosing map entry.
    pub fn strip_indices(&self) -> Address {
        let keep = self
            .steps
            .iter()
            .rposition(|step| matches!(step, Step::Key(_)))
            .map_or(0, |pos| pos + 1);
        self.prefix(keep)
    }

    /// Same address with the final key replaced.
    pub fn with_last_key(&self, key: impl Into<String>) -> Address {
        let mut steps = self.steps.clone();
        if let Some(last) = steps.last_mut() {
            *last = Step::Key(key.into());
        }
        Self { steps }
    }

    /// Returns `true` if `prefix` is an ancestor of, or equal to, this address.
    pub fn starts_with(&self, prefix: &Address) -> bool {
        self.steps.starts_with(&prefix.steps)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "(root)");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
