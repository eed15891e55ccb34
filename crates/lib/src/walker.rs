//! Generic depth-first traversal over description trees.
//!
//! [`TreeWalker`] visits every entry of a tree and hands control to a
//! [`Visitor`] at three points: when entering a map key, when leaving it, and
//! at each scalar leaf. The visitor mutates the tree through addresses; the
//! walker takes care of deleting, renaming and re-visiting entries according
//! to what the visitor returns.
//!
//! Maps are walked over a snapshot of their keys taken before the first
//! callback, so keys inserted by the visitor during the walk are not visited
//! and keys it removed are skipped.

use crate::{
    Result,
    constants::DEFAULT_MAX_REWALKS,
    resolve::ResolveError,
    tree::{Address, Value},
};

/// What the walker should do with a map entry after `on_key_enter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Keep the entry, renamed to the given key if it differs, and descend
    Keep(String),
    /// Remove the entry and its subtree
    Delete,
    /// Leave the entry untouched and do not descend
    Skip,
}

/// Callbacks driving a [`TreeWalker`].
///
/// Each callback receives the whole tree and the address of the entry being
/// visited (for `on_key_enter`/`on_key_exit`, the address of the key itself).
pub trait Visitor {
    fn on_key_enter(&mut self, tree: &mut Value, key: &str, address: &Address)
    -> Result<KeyAction>;

    fn on_key_exit(&mut self, _tree: &mut Value, _key: &str, _address: &Address) -> Result<()> {
        Ok(())
    }

    /// Returns `true` if the leaf was changed and must be visited again.
    fn on_leaf(&mut self, _tree: &mut Value, _address: &Address) -> Result<bool> {
        Ok(false)
    }
}

/// Depth-first walker with a bounded leaf re-walk.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    max_rewalks: usize,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REWALKS)
    }
}

impl TreeWalker {
    pub fn new(max_rewalks: usize) -> Self {
        Self { max_rewalks }
    }

    /// Walks the whole tree.
    pub fn walk<V: Visitor + ?Sized>(&self, tree: &mut Value, visitor: &mut V) -> Result<()> {
        self.walk_at(tree, visitor, &Address::root())
    }

    /// Walks the subtree at `address`. A missing address is not an error:
    /// the visitor may have removed it.
    pub fn walk_at<V: Visitor + ?Sized>(
        &self,
        tree: &mut Value,
        visitor: &mut V,
        address: &Address,
    ) -> Result<()> {
        let mut rewalks = 0;
        loop {
            let node = match tree.read(address) {
                Ok(node) => node,
                Err(err) if err.is_not_found() => return Ok(()),
                Err(err) => return Err(err.into()),
            };

            match node {
                Value::Sequence(items) => {
                    let len = items.len();
                    for index in 0..len {
                        self.walk_at(tree, visitor, &address.child(index))?;
                    }
                    return Ok(());
                }
                Value::Map(map) => {
                    let keys: Vec<String> = map.keys().map(str::to_string).collect();
                    for key in keys {
                        self.walk_entry(tree, visitor, address, key)?;
                    }
                    return Ok(());
                }
                _ => {
                    if !visitor.on_leaf(tree, address)? {
                        return Ok(());
                    }
                    rewalks += 1;
                    if rewalks > self.max_rewalks {
                        return Err(ResolveError::LoopBoundExceeded {
                            stage: "Leaf re-walk",
                            limit: self.max_rewalks,
                            address: address.clone(),
                        }
                        .into());
                    }
                    tracing::trace!(%address, rewalks, "Leaf changed, walking it again");
                }
            }
        }
    }

    fn walk_entry<V: Visitor + ?Sized>(
        &self,
        tree: &mut Value,
        visitor: &mut V,
        parent: &Address,
        key: String,
    ) -> Result<()> {
        let entry = parent.child(key.as_str());
        if !tree.contains(&entry) {
            return Ok(());
        }

        match visitor.on_key_enter(tree, &key, &entry)? {
            KeyAction::Delete => {
                tree.delete(&entry)?;
                Ok(())
            }
            KeyAction::Skip => Ok(()),
            KeyAction::Keep(new_key) => {
                let entry = if new_key == key {
                    entry
                } else {
                    // The visitor may already have performed the rename
                    if tree.contains(&entry) {
                        tree.rename_last_key(&entry, &new_key, None)?;
                    }
                    entry.with_last_key(new_key.as_str())
                };
                self.walk_at(tree, visitor, &entry)?;
                visitor.on_key_exit(tree, &new_key, &entry)
            }
        }
    }
}
