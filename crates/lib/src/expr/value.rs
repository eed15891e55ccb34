//! Runtime values of the expression language.

use std::{cmp::Ordering, fmt};

use super::ExprError;
use crate::tree::{Map, Value, value::format_float};

/// A value produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<EvalValue>),
    Tuple(Vec<EvalValue>),
    Dict(Vec<(String, EvalValue)>),
}

impl EvalValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalValue::None => "NoneType",
            EvalValue::Bool(_) => "bool",
            EvalValue::Int(_) => "int",
            EvalValue::Float(_) => "float",
            EvalValue::Str(_) => "str",
            EvalValue::List(_) => "list",
            EvalValue::Tuple(_) => "tuple",
            EvalValue::Dict(_) => "dict",
        }
    }

    /// Truthiness used by `and`, `or`, `not`, conditionals and filters.
    pub fn is_truthy(&self) -> bool {
        match self {
            EvalValue::None => false,
            EvalValue::Bool(b) => *b,
            EvalValue::Int(n) => *n != 0,
            EvalValue::Float(f) => *f != 0.0,
            EvalValue::Str(s) => !s.is_empty(),
            EvalValue::List(items) | EvalValue::Tuple(items) => !items.is_empty(),
            EvalValue::Dict(entries) => !entries.is_empty(),
        }
    }

    /// Numeric view, with booleans counting as 0 and 1.
    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            EvalValue::Bool(b) => Some(Number::Int(*b as i64)),
            EvalValue::Int(n) => Some(Number::Int(*n)),
            EvalValue::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Items of an iterable value. Iterating a dict yields its keys and a
    /// string yields its characters.
    pub fn iter_items(&self) -> Result<Vec<EvalValue>, ExprError> {
        match self {
            EvalValue::List(items) | EvalValue::Tuple(items) => Ok(items.clone()),
            EvalValue::Str(s) => Ok(s.chars().map(|c| EvalValue::Str(c.to_string())).collect()),
            EvalValue::Dict(entries) => Ok(entries
                .iter()
                .map(|(k, _)| EvalValue::Str(k.clone()))
                .collect()),
            other => Err(ExprError::TypeError {
                message: format!("'{}' object is not iterable", other.type_name()),
            }),
        }
    }

    /// Ordering for `<`, `<=`, `>`, `>=`.
    pub(crate) fn compare(&self, other: &EvalValue) -> Result<Ordering, ExprError> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return match (a, b) {
                (Number::Int(x), Number::Int(y)) => Ok(x.cmp(&y)),
                _ => a
                    .as_f64()
                    .partial_cmp(&b.as_f64())
                    .ok_or_else(|| ExprError::TypeError {
                        message: "cannot order NaN".to_string(),
                    }),
            };
        }
        match (self, other) {
            (EvalValue::Str(a), EvalValue::Str(b)) => Ok(a.cmp(b)),
            (EvalValue::List(a), EvalValue::List(b)) | (EvalValue::Tuple(a), EvalValue::Tuple(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if !x.loose_eq(y) {
                        return x.compare(y);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => Err(ExprError::TypeError {
                message: format!(
                    "'<' not supported between instances of '{}' and '{}'",
                    self.type_name(),
                    other.type_name()
                ),
            }),
        }
    }

    /// Equality where `1 == 1.0 == True`.
    pub(crate) fn loose_eq(&self, other: &EvalValue) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return match (a, b) {
                (Number::Int(x), Number::Int(y)) => x == y,
                _ => a.as_f64() == b.as_f64(),
            };
        }
        match (self, other) {
            (EvalValue::List(a), EvalValue::List(b)) | (EvalValue::Tuple(a), EvalValue::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (EvalValue::Dict(a), EvalValue::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.iter()
                            .find(|(bk, _)| bk == k)
                            .is_some_and(|(_, bv)| v.loose_eq(bv))
                    })
            }
            _ => self == other,
        }
    }

    /// The `repr()` form, used for items nested inside collections.
    pub fn to_repr(&self) -> String {
        match self {
            EvalValue::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            other => other.to_string(),
        }
    }

    /// Converts into a tree value. Tuples become sequences.
    pub fn into_tree_value(self) -> Value {
        match self {
            EvalValue::None => Value::Null,
            EvalValue::Bool(b) => Value::Bool(b),
            EvalValue::Int(n) => Value::Int(n),
            EvalValue::Float(f) => Value::Float(f),
            EvalValue::Str(s) => Value::Text(s),
            EvalValue::List(items) | EvalValue::Tuple(items) => {
                Value::Sequence(items.into_iter().map(EvalValue::into_tree_value).collect())
            }
            EvalValue::Dict(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_tree_value()))
                    .collect::<Map>(),
            ),
        }
    }
}

/// The `str()` form of a value.
impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(items: &[EvalValue]) -> String {
            items
                .iter()
                .map(EvalValue::to_repr)
                .collect::<Vec<_>>()
                .join(", ")
        }

        match self {
            EvalValue::None => write!(f, "None"),
            EvalValue::Bool(true) => write!(f, "True"),
            EvalValue::Bool(false) => write!(f, "False"),
            EvalValue::Int(n) => write!(f, "{n}"),
            EvalValue::Float(x) => write!(f, "{}", format_float(*x)),
            EvalValue::Str(s) => write!(f, "{s}"),
            EvalValue::List(items) => write!(f, "[{}]", join(items)),
            EvalValue::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0].to_repr()),
            EvalValue::Tuple(items) => write!(f, "({})", join(items)),
            EvalValue::Dict(entries) => {
                let body = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", EvalValue::Str(k.clone()).to_repr(), v.to_repr()))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{body}}}")
            }
        }
    }
}

impl From<&Value> for EvalValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => EvalValue::None,
            Value::Bool(b) => EvalValue::Bool(*b),
            Value::Int(n) => EvalValue::Int(*n),
            Value::Float(f) => EvalValue::Float(*f),
            Value::Text(s) => EvalValue::Str(s.clone()),
            Value::Sequence(items) => EvalValue::List(items.iter().map(EvalValue::from).collect()),
            Value::Map(map) => EvalValue::Dict(
                map.iter()
                    .map(|(k, v)| (k.to_string(), EvalValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Numeric operand after bool promotion.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}
