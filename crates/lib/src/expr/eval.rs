//! Tree-walking evaluator for parsed expressions.

use std::cmp::Ordering;

use super::{
    ExprError,
    parser::{BinaryOp, CompareOp, Expr, UnaryOp, parse},
    value::{EvalValue, Number},
};
use crate::constants::{DEFAULT_MAX_EVAL_ITEMS, DEFAULT_MAX_RANGE_LEN};

/// The only functions an expression can call.
pub const BUILTINS: &[&str] = &["int", "str", "range", "enumerate", "len"];

/// Evaluates expressions in a sandbox.
///
/// Nothing outside the expression is reachable: names resolve only to the
/// bindings passed in and to loop variables, and calls are limited to
/// [`BUILTINS`]. Each `range()` is capped at `max_range_len` items and one
/// evaluation may build at most `max_items` items overall.
///
/// ```
/// # use blueprint::expr::{EvalValue, Evaluator};
/// let evaluator = Evaluator::default();
/// assert_eq!(evaluator.evaluate("len(range(3)) * 2")?, EvalValue::Int(6));
/// assert!(evaluator.evaluate("open('x')").is_err());
/// # Ok::<(), blueprint::expr::ExprError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    max_range_len: usize,
    max_items: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RANGE_LEN)
    }
}

/// Variable bindings visible to an expression. Later bindings shadow
/// earlier ones.
struct Env {
    vars: Vec<(String, EvalValue)>,
    /// Items built so far
    items: usize,
}

impl Env {
    fn charge(&mut self, items: usize, limit: usize) -> Result<(), ExprError> {
        self.items = self.items.saturating_add(items);
        if self.items > limit {
            return Err(ExprError::TooManyItems { limit });
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&EvalValue> {
        self.vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

fn type_error(message: impl Into<String>) -> ExprError {
    ExprError::TypeError {
        message: message.into(),
    }
}

fn unsupported(op: &str, left: &EvalValue, right: &EvalValue) -> ExprError {
    type_error(format!(
        "unsupported operand type(s) for {op}: '{}' and '{}'",
        left.type_name(),
        right.type_name()
    ))
}

fn expect_int(function: &str, value: &EvalValue) -> Result<i64, ExprError> {
    match value {
        EvalValue::Int(n) => Ok(*n),
        EvalValue::Bool(b) => Ok(*b as i64),
        other => Err(type_error(format!(
            "{function}() expected an integer, got '{}'",
            other.type_name()
        ))),
    }
}

fn check_arity(
    function: &str,
    args: &[EvalValue],
    min: usize,
    max: usize,
) -> Result<(), ExprError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        return Err(ExprError::Arity {
            function: function.to_string(),
            expected,
            given: args.len(),
        });
    }
    Ok(())
}

impl Evaluator {
    pub fn new(max_range_len: usize) -> Self {
        Self {
            max_range_len,
            max_items: DEFAULT_MAX_EVAL_ITEMS.max(max_range_len),
        }
    }

    /// Sets the total number of items one evaluation may build.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Evaluates `src` with no bindings.
    pub fn evaluate(&self, src: &str) -> Result<EvalValue, ExprError> {
        self.evaluate_with(src, &[])
    }

    /// Evaluates `src` with the given name bindings.
    pub fn evaluate_with(
        &self,
        src: &str,
        bindings: &[(String, EvalValue)],
    ) -> Result<EvalValue, ExprError> {
        let expr = parse(src)?;
        let mut env = Env {
            vars: bindings.to_vec(),
            items: 0,
        };
        self.eval(&expr, &mut env)
    }

    fn eval(&self, expr: &Expr, env: &mut Env) -> Result<EvalValue, ExprError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => match env.lookup(name) {
                Some(value) => Ok(value.clone()),
                None if BUILTINS.contains(&name.as_str()) => Err(type_error(format!(
                    "builtin '{name}' can only be called"
                ))),
                None => Err(ExprError::UnknownName { name: name.clone() }),
            },
            Expr::List(items) => Ok(EvalValue::List(self.eval_all(items, env)?)),
            Expr::Tuple(items) => Ok(EvalValue::Tuple(self.eval_all(items, env)?)),
            Expr::Dict(entries) => {
                let mut out: Vec<(String, EvalValue)> = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match self.eval(key, env)? {
                        EvalValue::Str(s) => s,
                        other => {
                            return Err(type_error(format!(
                                "dict keys must be str, not '{}'",
                                other.type_name()
                            )));
                        }
                    };
                    let value = self.eval(value, env)?;
                    match out.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => out.push((key, value)),
                    }
                }
                Ok(EvalValue::Dict(out))
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand, env)?;
                match (op, value.as_number()) {
                    (UnaryOp::Neg, Some(Number::Int(n))) => {
                        n.checked_neg().map(EvalValue::Int).ok_or(ExprError::Overflow)
                    }
                    (UnaryOp::Neg, Some(Number::Float(f))) => Ok(EvalValue::Float(-f)),
                    (UnaryOp::Pos, Some(Number::Int(n))) => Ok(EvalValue::Int(n)),
                    (UnaryOp::Pos, Some(Number::Float(f))) => Ok(EvalValue::Float(f)),
                    (_, None) => Err(type_error(format!(
                        "bad operand type for unary operator: '{}'",
                        value.type_name()
                    ))),
                }
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                let result = self.binary(*op, &left, &right)?;
                env.charge(item_count(&result), self.max_items)?;
                Ok(result)
            }
            Expr::Compare(first, rest) => {
                let mut left = self.eval(first, env)?;
                for (op, right) in rest {
                    let right = self.eval(right, env)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(EvalValue::Bool(false));
                    }
                    left = right;
                }
                Ok(EvalValue::Bool(true))
            }
            Expr::And(left, right) => {
                let left = self.eval(left, env)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right, env)
            }
            Expr::Or(left, right) => {
                let left = self.eval(left, env)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right, env)
            }
            Expr::Not(operand) => Ok(EvalValue::Bool(!self.eval(operand, env)?.is_truthy())),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(condition, env)?.is_truthy() {
                    self.eval(then, env)
                } else {
                    self.eval(otherwise, env)
                }
            }
            Expr::Call { function, args } => {
                let name = match function.as_ref() {
                    Expr::Name(name) if BUILTINS.contains(&name.as_str()) => name.clone(),
                    Expr::Name(name) => return Err(ExprError::ForbiddenCall { name: name.clone() }),
                    _ => {
                        return Err(ExprError::ForbiddenCall {
                            name: "<expression>".to_string(),
                        });
                    }
                };
                let args = self.eval_all(args, env)?;
                let result = self.call(&name, &args)?;
                env.charge(item_count(&result), self.max_items)?;
                Ok(result)
            }
            Expr::Index { target, index } => {
                let target = self.eval(target, env)?;
                let index = self.eval(index, env)?;
                subscript(&target, &index)
            }
            Expr::ListComp {
                element,
                targets,
                iterable,
                condition,
            } => {
                let items = self.eval(iterable, env)?.iter_items()?;
                let mut out = Vec::new();
                for item in items {
                    let depth = env.vars.len();
                    bind_targets(env, targets, item)?;
                    let keep = match condition {
                        Some(condition) => self.eval(condition, env)?.is_truthy(),
                        None => true,
                    };
                    if keep {
                        env.charge(1, self.max_items)?;
                        out.push(self.eval(element, env)?);
                    }
                    env.vars.truncate(depth);
                }
                Ok(EvalValue::List(out))
            }
        }
    }

    fn eval_all(&self, items: &[Expr], env: &mut Env) -> Result<Vec<EvalValue>, ExprError> {
        items.iter().map(|item| self.eval(item, env)).collect()
    }

    fn call(&self, function: &str, args: &[EvalValue]) -> Result<EvalValue, ExprError> {
        match function {
            "int" => {
                check_arity(function, args, 1, 1)?;
                to_int(&args[0])
            }
            "str" => {
                check_arity(function, args, 0, 1)?;
                Ok(EvalValue::Str(
                    args.first().map(ToString::to_string).unwrap_or_default(),
                ))
            }
            "len" => {
                check_arity(function, args, 1, 1)?;
                let len = match &args[0] {
                    EvalValue::Str(s) => s.chars().count(),
                    EvalValue::List(items) | EvalValue::Tuple(items) => items.len(),
                    EvalValue::Dict(entries) => entries.len(),
                    other => {
                        return Err(type_error(format!(
                            "object of type '{}' has no len()",
                            other.type_name()
                        )));
                    }
                };
                Ok(EvalValue::Int(len as i64))
            }
            "range" => {
                check_arity(function, args, 1, 3)?;
                let ints = args
                    .iter()
                    .map(|arg| expect_int(function, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let (start, stop, step) = match ints.as_slice() {
                    [stop] => (0, *stop, 1),
                    [start, stop] => (*start, *stop, 1),
                    [start, stop, step] => (*start, *stop, *step),
                    _ => unreachable!("arity checked above"),
                };
                self.range(start, stop, step)
            }
            "enumerate" => {
                check_arity(function, args, 1, 2)?;
                let start = match args.get(1) {
                    Some(arg) => expect_int(function, arg)?,
                    None => 0,
                };
                let items = args[0].iter_items()?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let index = start.checked_add(i as i64).ok_or(ExprError::Overflow)?;
                    out.push(EvalValue::Tuple(vec![EvalValue::Int(index), item]));
                }
                Ok(EvalValue::List(out))
            }
            other => Err(ExprError::ForbiddenCall {
                name: other.to_string(),
            }),
        }
    }

    fn range(&self, start: i64, stop: i64, step: i64) -> Result<EvalValue, ExprError> {
        if step == 0 {
            return Err(ExprError::ValueError {
                message: "range() arg 3 must not be zero".to_string(),
            });
        }
        let (start, stop, step) = (start as i128, stop as i128, step as i128);
        let span = if step > 0 { stop - start } else { start - stop };
        let len = if span <= 0 {
            0
        } else {
            (span + step.abs() - 1) / step.abs()
        };
        if len > self.max_range_len as i128 {
            return Err(ExprError::RangeTooLarge {
                len: len as u64,
                limit: self.max_range_len,
            });
        }
        Ok(EvalValue::List(
            (0..len)
                .map(|i| EvalValue::Int((start + i * step) as i64))
                .collect(),
        ))
    }

    fn repeat<T: Clone>(&self, items: &[T], times: i64) -> Result<Vec<T>, ExprError> {
        let times = times.max(0) as u64;
        let len = (items.len() as u64).saturating_mul(times);
        if len > self.max_range_len as u64 {
            return Err(ExprError::RangeTooLarge {
                len,
                limit: self.max_range_len,
            });
        }
        Ok((0..times).flat_map(|_| items.iter().cloned()).collect())
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: &EvalValue,
        right: &EvalValue,
    ) -> Result<EvalValue, ExprError> {
        use EvalValue::{Int, List, Str, Tuple};

        match (op, left, right) {
            (BinaryOp::Add, Str(a), Str(b)) => return Ok(Str(format!("{a}{b}"))),
            (BinaryOp::Add, List(a), List(b)) => return Ok(List([a.clone(), b.clone()].concat())),
            (BinaryOp::Add, Tuple(a), Tuple(b)) => {
                return Ok(Tuple([a.clone(), b.clone()].concat()));
            }
            (BinaryOp::Mul, Str(s), Int(n)) | (BinaryOp::Mul, Int(n), Str(s)) => {
                let chars: Vec<char> = s.chars().collect();
                return Ok(Str(self.repeat(&chars, *n)?.into_iter().collect()));
            }
            (BinaryOp::Mul, List(items), Int(n)) | (BinaryOp::Mul, Int(n), List(items)) => {
                return Ok(List(self.repeat(items, *n)?));
            }
            _ => {}
        }

        let symbol = match op {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
        };
        let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
            return Err(unsupported(symbol, left, right));
        };

        match (a, b) {
            (Number::Int(x), Number::Int(y)) => int_arithmetic(op, x, y),
            _ => float_arithmetic(op, a.as_f64(), b.as_f64()),
        }
    }
}

fn int_arithmetic(op: BinaryOp, x: i64, y: i64) -> Result<EvalValue, ExprError> {
    let int = |r: Option<i64>| r.map(EvalValue::Int).ok_or(ExprError::Overflow);
    match op {
        BinaryOp::Add => int(x.checked_add(y)),
        BinaryOp::Sub => int(x.checked_sub(y)),
        BinaryOp::Mul => int(x.checked_mul(y)),
        BinaryOp::Div => {
            if y == 0 {
                return Err(ExprError::ZeroDivision);
            }
            Ok(EvalValue::Float(x as f64 / y as f64))
        }
        BinaryOp::FloorDiv => {
            if y == 0 {
                return Err(ExprError::ZeroDivision);
            }
            let q = x.checked_div(y).ok_or(ExprError::Overflow)?;
            if x % y != 0 && ((x < 0) != (y < 0)) {
                Ok(EvalValue::Int(q - 1))
            } else {
                Ok(EvalValue::Int(q))
            }
        }
        BinaryOp::Mod => {
            if y == 0 {
                return Err(ExprError::ZeroDivision);
            }
            let r = x.checked_rem(y).ok_or(ExprError::Overflow)?;
            if r != 0 && ((r < 0) != (y < 0)) {
                Ok(EvalValue::Int(r + y))
            } else {
                Ok(EvalValue::Int(r))
            }
        }
        BinaryOp::Pow => {
            if y < 0 {
                return float_arithmetic(op, x as f64, y as f64);
            }
            let exponent = u32::try_from(y).map_err(|_| ExprError::Overflow)?;
            int(x.checked_pow(exponent))
        }
    }
}

fn float_arithmetic(op: BinaryOp, x: f64, y: f64) -> Result<EvalValue, ExprError> {
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if y == 0.0 => {
            return Err(ExprError::ZeroDivision);
        }
        BinaryOp::Div => x / y,
        BinaryOp::FloorDiv => (x / y).floor(),
        BinaryOp::Mod => x - y * (x / y).floor(),
        BinaryOp::Pow => {
            if x == 0.0 && y < 0.0 {
                return Err(ExprError::ZeroDivision);
            }
            x.powf(y)
        }
    };
    Ok(EvalValue::Float(result))
}

fn compare(op: CompareOp, left: &EvalValue, right: &EvalValue) -> Result<bool, ExprError> {
    Ok(match op {
        CompareOp::Eq => left.loose_eq(right),
        CompareOp::NotEq => !left.loose_eq(right),
        CompareOp::Lt => left.compare(right)? == Ordering::Less,
        CompareOp::Le => left.compare(right)? != Ordering::Greater,
        CompareOp::Gt => left.compare(right)? == Ordering::Greater,
        CompareOp::Ge => left.compare(right)? != Ordering::Less,
        CompareOp::In => contains(right, left)?,
        CompareOp::NotIn => !contains(right, left)?,
    })
}

fn contains(container: &EvalValue, needle: &EvalValue) -> Result<bool, ExprError> {
    match (container, needle) {
        (EvalValue::Str(haystack), EvalValue::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        (EvalValue::Str(_), other) => Err(type_error(format!(
            "'in <string>' requires string as left operand, not '{}'",
            other.type_name()
        ))),
        (EvalValue::List(items) | EvalValue::Tuple(items), needle) => {
            Ok(items.iter().any(|item| item.loose_eq(needle)))
        }
        (EvalValue::Dict(entries), EvalValue::Str(key)) => Ok(entries.iter().any(|(k, _)| k == key)),
        (EvalValue::Dict(_), _) => Ok(false),
        (other, _) => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

fn subscript(target: &EvalValue, index: &EvalValue) -> Result<EvalValue, ExprError> {
    fn position(len: usize, index: i64) -> Result<usize, ExprError> {
        let resolved = if index < 0 { index + len as i64 } else { index };
        if resolved < 0 || resolved >= len as i64 {
            return Err(ExprError::IndexOutOfRange { index });
        }
        Ok(resolved as usize)
    }

    match (target, index) {
        (EvalValue::List(items) | EvalValue::Tuple(items), EvalValue::Int(i)) => {
            Ok(items[position(items.len(), *i)?].clone())
        }
        (EvalValue::Str(s), EvalValue::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(EvalValue::Str(chars[position(chars.len(), *i)?].to_string()))
        }
        (EvalValue::Dict(entries), EvalValue::Str(key)) => entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| ExprError::KeyNotFound { key: key.clone() }),
        (target, index) => Err(type_error(format!(
            "'{}' object cannot be indexed by '{}'",
            target.type_name(),
            index.type_name()
        ))),
    }
}

fn to_int(value: &EvalValue) -> Result<EvalValue, ExprError> {
    match value {
        EvalValue::Int(n) => Ok(EvalValue::Int(*n)),
        EvalValue::Bool(b) => Ok(EvalValue::Int(*b as i64)),
        EvalValue::Float(f) => {
            let truncated = f.trunc();
            if !truncated.is_finite() || truncated.abs() >= 9.2e18 {
                return Err(ExprError::Overflow);
            }
            Ok(EvalValue::Int(truncated as i64))
        }
        EvalValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(EvalValue::Int)
            .map_err(|_| ExprError::ValueError {
                message: format!("invalid literal for int() with base 10: '{s}'"),
            }),
        other => Err(type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Items a freshly built value holds, for the evaluation budget.
fn item_count(value: &EvalValue) -> usize {
    match value {
        EvalValue::Str(s) => s.len(),
        EvalValue::List(items) | EvalValue::Tuple(items) => items.len(),
        EvalValue::Dict(entries) => entries.len(),
        _ => 0,
    }
}

fn bind_targets(env: &mut Env, targets: &[String], item: EvalValue) -> Result<(), ExprError> {
    if let [single] = targets {
        env.vars.push((single.clone(), item));
        return Ok(());
    }
    let parts = match item {
        EvalValue::List(parts) | EvalValue::Tuple(parts) => parts,
        other => {
            return Err(type_error(format!(
                "cannot unpack non-sequence '{}'",
                other.type_name()
            )));
        }
    };
    if parts.len() != targets.len() {
        return Err(ExprError::ValueError {
            message: format!(
                "expected {} values to unpack, got {}",
                targets.len(),
                parts.len()
            ),
        });
    }
    for (name, part) in targets.iter().zip(parts) {
        env.vars.push((name.clone(), part));
    }
    Ok(())
}
