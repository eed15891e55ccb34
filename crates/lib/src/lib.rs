//!
//! Blueprint: resolve templated deployment descriptions into concrete manifests.
//!
//! A description is a commented JSON document listing nodes (hosts), nested
//! component groups, components and databases. Authors factor it with
//! references, templates, conditional keys and small expressions; this crate
//! expands all of that into a plain manifest that deployers can consume.
//!
//! ## Core Concepts
//!
//! * **Trees (`tree::Value`)**: The JSON-like document, addressed by `tree::Address`.
//! * **Walker (`walker::TreeWalker`)**: Depth-first traversal driven by a `walker::Visitor`.
//! * **Scopes (`scope::ScopeChain`)**: Lexical lookup of references and templates, and
//!   deployment-path navigation over nodes, groups and components.
//! * **Resolver (`resolve::Resolver`)**: Expands references (`${x}`), templates (`@use:`),
//!   presence tests (`@if:`), inline functions (`<<x: x + 1>>`) and expressions (`$<...>`).
//! * **Cleaner (`clean::Cleaner`)**: Strips authoring vocabulary from a resolved tree.
//! * **Manifest (`manifest`)**: Read-only views of the resolved components for deployers.
//!
//! ## Usage
//!
//! ```
//! use blueprint::{clean::Cleaner, manifest, resolve::Resolver, tree};
//!
//! let mut doc = tree::parse_commented(r#"{
//!     "basePort": 8080,
//!     "Nodes": {
//!         "node1": {
//!             "Group:svc": {
//!                 "Components": {
//!                     "component": {
//!                         "ComponentName": "echo",
//!                         "EnvironmentVariables": { "port": "${basePort}" }
//!                     }
//!                 }
//!             }
//!         }
//!     }
//! }"#)?;
//!
//! Resolver::default().resolve(&mut doc)?;
//! Cleaner::default().clean(&mut doc)?;
//!
//! let components = manifest::components(&doc)?;
//! assert_eq!(components[0].environment["port"], "8080");
//! # Ok::<(), blueprint::Error>(())
//! ```

pub mod clean;
pub mod constants;
pub mod directive;
pub mod expr;
pub mod manifest;
pub mod resolve;
pub mod scope;
pub mod tree;
pub mod walker;

/// Re-export the tree value type for easier access.
pub use tree::{Address, Value};

/// Result type used throughout the Blueprint library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Blueprint library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured addressing errors from the tree module
    #[error(transparent)]
    Tree(tree::TreeError),

    /// Structured resolution errors from the resolve module
    #[error(transparent)]
    Resolve(resolve::ResolveError),

    /// Structured expression errors from the expr module
    #[error(transparent)]
    Expr(expr::ExprError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Tree(_) => "tree",
            Error::Resolve(_) => "resolve",
            Error::Expr(_) => "expr",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates an address, reference or template was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_not_found(),
            Error::Resolve(resolve_err) => resolve_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is an address kind mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_type_mismatch(),
            _ => false,
        }
    }

    /// Check if this error signals a cycle or runaway expansion.
    pub fn is_loop_bound(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_loop_bound(),
            _ => false,
        }
    }

    /// Check if this error comes from evaluating an expression.
    pub fn is_expression_error(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_expression_error(),
            Error::Expr(_) => true,
            _ => false,
        }
    }

    /// Check if this error is a structural validation failure.
    pub fn is_structural(&self) -> bool {
        match self {
            Error::Resolve(resolve_err) => resolve_err.is_structural(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// The address the error was raised at, when it has one.
    pub fn address(&self) -> Option<&Address> {
        match self {
            Error::Tree(tree_err) => tree_err.address(),
            Error::Resolve(resolve_err) => Some(resolve_err.address()),
            _ => None,
        }
    }
}
