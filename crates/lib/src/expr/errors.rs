//! Error types for the expression language.

use thiserror::Error;

/// Structured error types for expression parsing and evaluation.
#[non_exhaustive]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExprError {
    /// The source text is not a valid expression
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A name that is neither bound nor an allowed builtin
    #[error("Name '{name}' is not defined")]
    UnknownName { name: String },

    /// A call to anything outside the builtin allow-list
    #[error("Call to '{name}' is not allowed")]
    ForbiddenCall { name: String },

    /// Wrong number of arguments to a builtin
    #[error("{function}() takes {expected} arguments ({given} given)")]
    Arity {
        function: String,
        expected: String,
        given: usize,
    },

    /// Operand or argument of the wrong type
    #[error("Type error: {message}")]
    TypeError { message: String },

    /// Invalid literal conversion, e.g. `int('abc')`
    #[error("Value error: {message}")]
    ValueError { message: String },

    #[error("Division by zero")]
    ZeroDivision,

    #[error("Integer overflow")]
    Overflow,

    /// Sequence index outside the sequence
    #[error("Index {index} out of range")]
    IndexOutOfRange { index: i64 },

    /// Missing dict key
    #[error("Key '{key}' not found")]
    KeyNotFound { key: String },

    /// `range()` would exceed the configured size limit
    #[error("range() of {len} items exceeds the limit of {limit}")]
    RangeTooLarge { len: u64, limit: usize },

    /// The expression as a whole built more items than allowed
    #[error("Expression builds more than {limit} items")]
    TooManyItems { limit: usize },
}

impl ExprError {
    /// Check if this error was raised before evaluation started
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, ExprError::Syntax { .. })
    }

    /// Check if this error comes from the builtin allow-list
    pub fn is_sandbox_violation(&self) -> bool {
        matches!(
            self,
            ExprError::UnknownName { .. } | ExprError::ForbiddenCall { .. }
        )
    }
}

// Conversion from ExprError to the main Error type
impl From<ExprError> for crate::Error {
    fn from(err: ExprError) -> Self {
        crate::Error::Expr(err)
    }
}
