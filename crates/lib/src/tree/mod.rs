//! Addressable description trees.
//!
//! This module provides the tree model every other part of the crate works
//! on: the [`Value`] tagged union, the ordered [`Map`], and [`Address`]-based
//! read/write/rename/delete primitives. Loading and saving commented JSON
//! lives in [`io`].
//!
//! # Usage
//!
//! ```
//! use blueprint::tree::{self, Address, Value};
//!
//! let mut doc = tree::parse_commented(r#"{
//!     // hosts
//!     "Nodes": { "node1": { "Port": 80 } }
//! }"#)?;
//!
//! let port = Address::from_keys(["Nodes", "node1", "Port"]);
//! assert_eq!(doc.read(&port)?, &Value::Int(80));
//!
//! doc.write(&port, 8080)?;
//! doc.rename_last_key(&port, "HttpPort", None)?;
//! assert_eq!(doc.read(&Address::from_keys(["Nodes", "node1", "HttpPort"]))?, &Value::Int(8080));
//! # Ok::<(), blueprint::Error>(())
//! ```

pub mod address;
pub mod errors;
pub mod io;
pub mod value;

pub use address::{Address, Step};
pub use errors::TreeError;
pub use io::{load, parse_commented, save, strip_comments, to_pretty_string};
pub use value::{Map, Value};

impl Value {
    fn step_into(&self, step: &Step, at: impl Fn() -> Address) -> Result<&Value, TreeError> {
        match (self, step) {
            (Value::Map(map), Step::Key(key)) => {
                map.get(key).ok_or_else(|| TreeError::AddressNotFound { address: at() })
            }
            (Value::Sequence(items), Step::Index(index)) => items
                .get(*index)
                .ok_or_else(|| TreeError::AddressNotFound { address: at() }),
            (other, step) => Err(TreeError::AddressTypeMismatch {
                address: at(),
                expected: step.container_kind(),
                found: other.type_name(),
            }),
        }
    }

    fn step_into_mut(
        &mut self,
        step: &Step,
        at: impl Fn() -> Address,
    ) -> Result<&mut Value, TreeError> {
        match (self, step) {
            (Value::Map(map), Step::Key(key)) => map
                .get_mut(key)
                .ok_or_else(|| TreeError::AddressNotFound { address: at() }),
            (Value::Sequence(items), Step::Index(index)) => items
                .get_mut(*index)
                .ok_or_else(|| TreeError::AddressNotFound { address: at() }),
            (other, step) => Err(TreeError::AddressTypeMismatch {
                address: at(),
                expected: step.container_kind(),
                found: other.type_name(),
            }),
        }
    }

    /// Reads the value at `address`.
    ///
    /// # Errors
    /// [`TreeError::AddressNotFound`] if a step is absent,
    /// [`TreeError::AddressTypeMismatch`] if a key step meets a sequence (or
    /// an index step meets a map or scalar).
    pub fn read(&self, address: &Address) -> Result<&Value, TreeError> {
        let mut current = self;
        for (depth, step) in address.steps().iter().enumerate() {
            current = current.step_into(step, || address.prefix(depth + 1))?;
        }
        Ok(current)
    }

    /// Reads the value at `address`, returning `default` when it is absent.
    ///
    /// Type mismatches are still reported.
    pub fn read_or<'a>(
        &'a self,
        address: &Address,
        default: &'a Value,
    ) -> Result<&'a Value, TreeError> {
        match self.read(address) {
            Err(TreeError::AddressNotFound { .. }) => Ok(default),
            other => other,
        }
    }

    /// Mutable counterpart of [`Value::read`].
    pub fn read_mut(&mut self, address: &Address) -> Result<&mut Value, TreeError> {
        let mut current = self;
        for (depth, step) in address.steps().iter().enumerate() {
            current = current.step_into_mut(step, || address.prefix(depth + 1))?;
        }
        Ok(current)
    }

    /// Returns `true` if something exists at `address`.
    pub fn contains(&self, address: &Address) -> bool {
        self.read(address).is_ok()
    }

    /// Writes `value` at `address`, replacing what was there.
    ///
    /// The parent container must already exist. A key missing from a parent
    /// map is appended; an index equal to the parent sequence length appends.
    /// Writing to the root address replaces the whole tree.
    pub fn write(&mut self, address: &Address, value: impl Into<Value>) -> Result<(), TreeError> {
        let value = value.into();
        let Some(parent_address) = address.parent() else {
            *self = value;
            return Ok(());
        };
        let parent = self.read_mut(&parent_address)?;
        match (parent, address.last()) {
            (Value::Map(map), Some(Step::Key(key))) => {
                map.insert(key.clone(), value);
                Ok(())
            }
            (Value::Sequence(items), Some(Step::Index(index))) => {
                if *index < items.len() {
                    items[*index] = value;
                    Ok(())
                } else if *index == items.len() {
                    items.push(value);
                    Ok(())
                } else {
                    Err(TreeError::AddressNotFound {
                        address: address.clone(),
                    })
                }
            }
            (other, step) => Err(TreeError::AddressTypeMismatch {
                address: address.clone(),
                expected: step.map_or("map", Step::container_kind),
                found: other.type_name(),
            }),
        }
    }

    /// Replaces the final key of `address` with `new_key`, preserving the
    /// entry's position among its siblings.
    ///
    /// The entry keeps its current value unless `new_value` is given.
    pub fn rename_last_key(
        &mut self,
        address: &Address,
        new_key: &str,
        new_value: Option<Value>,
    ) -> Result<(), TreeError> {
        let (Some(parent_address), Some(old_key)) = (address.parent(), address.last_key()) else {
            return Err(TreeError::NotAKey {
                address: address.clone(),
            });
        };
        match self.read_mut(&parent_address)? {
            Value::Map(map) => {
                if map.rename(old_key, new_key, new_value) {
                    Ok(())
                } else {
                    Err(TreeError::AddressNotFound {
                        address: address.clone(),
                    })
                }
            }
            other => Err(TreeError::AddressTypeMismatch {
                address: parent_address,
                expected: "map",
                found: other.type_name(),
            }),
        }
    }

    /// Removes the entry at `address`, returning it.
    ///
    /// Deleting something that does not exist is a no-op.
    pub fn delete(&mut self, address: &Address) -> Result<Option<Value>, TreeError> {
        let Some(parent_address) = address.parent() else {
            return Ok(Some(std::mem::take(self)));
        };
        let parent = match self.read_mut(&parent_address) {
            Ok(parent) => parent,
            Err(TreeError::AddressNotFound { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };
        match (parent, address.last()) {
            (Value::Map(map), Some(Step::Key(key))) => Ok(map.remove(key)),
            (Value::Sequence(items), Some(Step::Index(index))) => {
                Ok((*index < items.len()).then(|| items.remove(*index)))
            }
            (other, step) => Err(TreeError::AddressTypeMismatch {
                address: address.clone(),
                expected: step.map_or("map", Step::container_kind),
                found: other.type_name(),
            }),
        }
    }
}
