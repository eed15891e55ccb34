//! A sandboxed expression language for description authors.
//!
//! Inline functions (`<<port: port + 1>>`), raw expressions (`$<2 * 8>`) and
//! presence tests (`key@if:'${Env}' == 'prod'`) are evaluated here. The
//! language is a side-effect free subset of Python expression syntax:
//! literals, arithmetic, comparisons, boolean logic, conditionals, indexing,
//! list comprehensions, and calls to exactly five builtins: `int`, `str`,
//! `range`, `enumerate` and `len`. Any other name is an error.
//!
//! # Usage
//!
//! ```
//! use blueprint::expr::{EvalValue, Evaluator, parse_literal};
//!
//! let evaluator = Evaluator::default();
//! let ports = evaluator.evaluate("[8000 + i for i in range(3)]")?;
//! assert_eq!(ports.to_string(), "[8000, 8001, 8002]");
//!
//! assert_eq!(parse_literal("8080"), Some(EvalValue::Int(8080)));
//! assert_eq!(parse_literal("1, 2"), None);
//! # Ok::<(), blueprint::expr::ExprError>(())
//! ```

pub mod errors;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use errors::ExprError;
pub use eval::{BUILTINS, Evaluator};
pub use parser::{Expr, parse};
pub use value::EvalValue;

/// Parses `src` as a single literal value.
///
/// Accepts numbers (optionally signed), strings, `True`, `False` and `None`.
/// Anything else, including tuples and expressions that would need
/// evaluation, yields `None`.
pub fn parse_literal(src: &str) -> Option<EvalValue> {
    let expr = parse(src.trim()).ok()?;
    if !expr.is_literal() {
        return None;
    }
    Evaluator::default().evaluate(src.trim()).ok()
}

/// Returns `true` if `name` can be bound as a variable.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(
            name,
            "True" | "False" | "None" | "and" | "or" | "not" | "in" | "if" | "else" | "for"
        )
}
