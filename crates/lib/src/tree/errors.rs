//! Error types for tree addressing and document loading.

use thiserror::Error;

use super::Address;

/// Structured error types for tree operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TreeError {
    /// Nothing exists at the given address
    #[error("Address not found: {address}")]
    AddressNotFound { address: Address },

    /// A step's kind (key or index) disagrees with the container it meets
    #[error("Address type mismatch at {address}: expected {expected}, found {found}")]
    AddressTypeMismatch {
        address: Address,
        expected: &'static str,
        found: &'static str,
    },

    /// A rename was requested on an address that does not end in a map key
    #[error("Cannot rename {address}: final step is not a map key")]
    NotAKey { address: Address },

    /// A loaded description did not parse to a map
    #[error("Description root must be a map, found {found}")]
    RootNotMap { found: &'static str },
}

impl TreeError {
    /// Check if this error indicates a missing address
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::AddressNotFound { .. })
    }

    /// Check if this error is a container kind mismatch
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            TreeError::AddressTypeMismatch { .. } | TreeError::NotAKey { .. }
        )
    }

    /// Get the address involved, if any
    pub fn address(&self) -> Option<&Address> {
        match self {
            TreeError::AddressNotFound { address }
            | TreeError::AddressTypeMismatch { address, .. }
            | TreeError::NotAKey { address } => Some(address),
            TreeError::RootNotMap { .. } => None,
        }
    }
}

// Conversion from TreeError to the main Error type
impl From<TreeError> for crate::Error {
    fn from(err: TreeError) -> Self {
        crate::Error::Tree(err)
    }
}
