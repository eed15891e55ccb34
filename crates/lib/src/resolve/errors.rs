//! Error types for description resolution.
//!
//! Every variant carries the address being resolved when the error was
//! raised, so a failing description can be traced to the offending entry.

use thiserror::Error;

use crate::{expr::ExprError, tree::Address};

/// Structured error types for resolution.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Scope-chain or deployment-path search found nothing
    #[error("Reference '{reference}' not found from {address}")]
    ReferenceNotFound { reference: String, address: Address },

    /// No template with this name is visible
    #[error("Template '{name}' not found from {address}")]
    TemplateNotFound { name: String, address: Address },

    /// A fixed-point loop did not settle within its bound
    #[error("{stage} did not settle within {limit} iterations at {address}")]
    LoopBoundExceeded {
        stage: &'static str,
        limit: usize,
        address: Address,
    },

    /// An inline function, raw expression or presence test failed
    #[error("Failed to evaluate '{expression}' at {address}: {source}")]
    ExpressionEvaluationFailure {
        expression: String,
        address: Address,
        #[source]
        source: ExprError,
    },

    /// The description violates the node/group/component structure
    #[error("Invalid structure at {address}: {reason}")]
    StructuralValidation { address: Address, reason: String },
}

impl ResolveError {
    /// Check if this error comes from a failed lookup
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ResolveError::ReferenceNotFound { .. } | ResolveError::TemplateNotFound { .. }
        )
    }

    /// Check if this error signals a cycle or runaway expansion
    pub fn is_loop_bound(&self) -> bool {
        matches!(self, ResolveError::LoopBoundExceeded { .. })
    }

    /// Check if this error comes from the expression language
    pub fn is_expression_error(&self) -> bool {
        matches!(self, ResolveError::ExpressionEvaluationFailure { .. })
    }

    /// Check if this error is a structural validation failure
    pub fn is_structural(&self) -> bool {
        matches!(self, ResolveError::StructuralValidation { .. })
    }

    /// Get the address the error was raised at
    pub fn address(&self) -> &Address {
        match self {
            ResolveError::ReferenceNotFound { address, .. }
            | ResolveError::TemplateNotFound { address, .. }
            | ResolveError::LoopBoundExceeded { address, .. }
            | ResolveError::ExpressionEvaluationFailure { address, .. }
            | ResolveError::StructuralValidation { address, .. } => address,
        }
    }

    pub(crate) fn structural(address: &Address, reason: impl Into<String>) -> Self {
        ResolveError::StructuralValidation {
            address: address.clone(),
            reason: reason.into(),
        }
    }
}

// Conversion from ResolveError to the main Error type
impl From<ResolveError> for crate::Error {
    fn from(err: ResolveError) -> Self {
        crate::Error::Resolve(err)
    }
}
