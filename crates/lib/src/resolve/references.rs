//! Substitution passes applied to strings during resolution.
//!
//! Three patterns are rewritten, each by its own fixed-point pass and in this
//! order:
//!
//! 1. `${ref}`: the value of a visible entry, or of a deployment path when
//!    `ref` contains `/`.
//! 2. `<<a, b: body>>`: an inline function over visible entries. With `=`
//!    instead of `:` the result is also stored back into the first
//!    parameter's entry.
//! 3. `$<body>`: a raw expression.
//!
//! Innermost occurrences are matched first, so a reference may build the name
//! of another (`${port_${Env}}`).
//!
//! Expression bodies may contain `<` and `>`. A body ends at the last closing
//! delimiter before any nested opener at which it parses, leaving a closer
//! for every enclosing opener, so `$<3 > 2>` is one expression. An opener
//! left without a closer after its pass is an error.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::{
    Result,
    expr::{EvalValue, Evaluator, ExprError, is_identifier, parse, parse_literal},
    resolve::ResolveError,
    scope::{Found, ScopeChain},
    tree::{Address, Value},
};

static PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^${}]+)\}").expect("invalid parameter pattern"));

const INLINE_FUNCTION: Delimited = Delimited {
    open: "<<",
    close: ">>",
    complete: inline_body_parses,
};

const RAW_EXPRESSION: Delimited = Delimited {
    open: "$<",
    close: ">",
    complete: expression_parses,
};

/// Byte ranges of one occurrence within a string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Occurrence {
    whole: Range<usize>,
    body: Range<usize>,
}

fn parameters(text: &str) -> Vec<Occurrence> {
    PARAMETER
        .captures_iter(text)
        .filter_map(|caps| {
            Some(Occurrence {
                whole: caps.get_match().range(),
                body: caps.get(1)?.range(),
            })
        })
        .collect()
}

fn expression_parses(body: &str) -> bool {
    parse(body.trim()).is_ok()
}

fn inline_body_parses(inner: &str) -> bool {
    inner
        .find([':', '='])
        .is_some_and(|split| expression_parses(&inner[split + 1..]))
}

/// Where a body ends.
enum Closing {
    At(usize),
    /// Another opener comes first; scanning restarts there
    Nested(usize),
    Unterminated,
}

/// An expression syntax whose body may contain its own closing characters.
struct Delimited {
    open: &'static str,
    close: &'static str,
    complete: fn(&str) -> bool,
}

impl Delimited {
    /// Innermost, non-overlapping occurrences, left to right. Scanning
    /// stops after a nested occurrence; the enclosing body is scanned again
    /// once it has been replaced.
    fn occurrences(&self, text: &str) -> Vec<Occurrence> {
        let mut found = Vec::new();
        let mut cursor = 0;
        let mut enclosing = 0;
        while let Some(offset) = text[cursor..].find(self.open) {
            let start = cursor + offset;
            let from = start + self.open.len();
            match self.closing(text, from, enclosing) {
                Closing::At(end) => {
                    found.push(Occurrence {
                        whole: start..end + self.close.len(),
                        body: from..end,
                    });
                    if enclosing > 0 {
                        break;
                    }
                    cursor = end + self.close.len();
                }
                Closing::Nested(inner) => {
                    enclosing += 1;
                    cursor = inner;
                }
                Closing::Unterminated => break,
            }
        }
        found
    }

    /// The last closer before any nested opener at which the body is
    /// complete and enough closers remain for the `enclosing` openers. Falls
    /// back to the first closer so evaluation reports why the body is
    /// malformed.
    fn closing(&self, text: &str, from: usize, enclosing: usize) -> Closing {
        let limit = text[from..]
            .find(self.open)
            .map_or(text.len(), |offset| from + offset);
        let mut first = None;
        let mut complete = None;
        let mut search = from;
        while let Some(offset) = text[search..limit].find(self.close) {
            let end = search + offset;
            first.get_or_insert(end);
            let remaining = text[end + self.close.len()..].matches(self.close).count();
            if remaining >= enclosing && (self.complete)(&text[from..end]) {
                complete = Some(end);
            }
            search = end + 1;
        }
        match complete.or(first) {
            Some(end) => Closing::At(end),
            None if limit < text.len() => Closing::Nested(limit),
            None => Closing::Unterminated,
        }
    }

    fn ensure_closed(&self, text: &str, address: &Address) -> Result<()> {
        let Some(start) = text.find(self.open) else {
            return Ok(());
        };
        Err(expression_failure(
            &text[start..],
            address,
            ExprError::Syntax {
                offset: 0,
                message: format!("'{}' is never closed by '{}'", self.open, self.close),
            },
        )
        .into())
    }
}

/// Returns `true` if `text` contains anything the substitution passes act on.
pub(crate) fn has_references(text: &str) -> bool {
    text.contains("${") || text.contains("<<") || text.contains("$<")
}

/// Adopts the typed value of a string that reads as a single number or
/// boolean literal.
///
/// ```text
/// "8080" -> 8080     "2.5" -> 2.5     "True" -> true
/// "'x'"  -> "'x'"    "1, 2" -> "1, 2" "None" -> "None"
/// ```
pub(crate) fn coerce(text: String) -> Value {
    match parse_literal(&text) {
        Some(EvalValue::Int(n)) => Value::Int(n),
        Some(EvalValue::Float(f)) => Value::Float(f),
        Some(EvalValue::Bool(b)) => Value::Bool(b),
        _ => Value::Text(text),
    }
}

fn expression_failure(expression: &str, address: &Address, source: ExprError) -> ResolveError {
    ResolveError::ExpressionEvaluationFailure {
        expression: expression.to_string(),
        address: address.clone(),
        source,
    }
}

/// Replaces every occurrence, failing on the first replacement error.
/// `replace` receives the whole occurrence and its body.
fn try_replace_all(
    occurrences: &[Occurrence],
    text: &str,
    mut replace: impl FnMut(&str, &str) -> Result<String>,
) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for occurrence in occurrences {
        out.push_str(&text[last..occurrence.whole.start]);
        out.push_str(&replace(
            &text[occurrence.whole.clone()],
            &text[occurrence.body.clone()],
        )?);
        last = occurrence.whole.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Runs the three substitution passes.
#[derive(Debug, Clone)]
pub(crate) struct References {
    max_iterations: usize,
    evaluator: Evaluator,
}

impl References {
    pub fn new(max_iterations: usize, evaluator: Evaluator) -> Self {
        Self {
            max_iterations,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Resolves a leaf string. Returns the new value, coerced to a number or
    /// boolean where possible, or `None` if the text did not change.
    pub fn resolve_text(
        &self,
        tree: &mut Value,
        text: &str,
        address: &Address,
    ) -> Result<Option<Value>> {
        let substituted = self.substitute(tree, text, address)?;
        if substituted == text {
            return Ok(None);
        }
        Ok(Some(coerce(substituted)))
    }

    /// Applies all passes to `text` and returns the resulting string.
    pub fn substitute(&self, tree: &mut Value, text: &str, address: &Address) -> Result<String> {
        if !has_references(text) {
            return Ok(text.to_string());
        }
        let text = self.fixed_point("Parameter reference", parameters, text, address, |_, reference| {
            self.parameter(tree, reference, address)
        })?;
        let text = self.fixed_point(
            "Inline function",
            |text| INLINE_FUNCTION.occurrences(text),
            &text,
            address,
            |whole, inner| self.inline_function(tree, whole, inner, address),
        )?;
        INLINE_FUNCTION.ensure_closed(&text, address)?;
        let text = self.fixed_point(
            "Raw expression",
            |text| RAW_EXPRESSION.occurrences(text),
            &text,
            address,
            |whole, body| self.raw_expression(whole, body, address),
        )?;
        RAW_EXPRESSION.ensure_closed(&text, address)?;
        Ok(text)
    }

    fn fixed_point(
        &self,
        stage: &'static str,
        find: impl Fn(&str) -> Vec<Occurrence>,
        text: &str,
        address: &Address,
        mut replace: impl FnMut(&str, &str) -> Result<String>,
    ) -> Result<String> {
        let mut text = text.to_string();
        for _ in 0..self.max_iterations {
            let occurrences = find(&text);
            if occurrences.is_empty() {
                return Ok(text);
            }
            text = try_replace_all(&occurrences, &text, &mut replace)?;
        }
        if !find(&text).is_empty() {
            return Err(ResolveError::LoopBoundExceeded {
                stage,
                limit: self.max_iterations,
                address: address.clone(),
            }
            .into());
        }
        Ok(text)
    }

    fn lookup<'t>(
        &self,
        tree: &'t Value,
        reference: &str,
        address: &Address,
    ) -> Result<Found<'t>> {
        let chain = ScopeChain::new(tree);
        let reference = reference.trim();
        if reference.contains('/') {
            return Ok(chain.find_by_path(reference, address)?);
        }
        chain
            .find_visible(reference, address)
            .ok_or_else(|| {
                ResolveError::ReferenceNotFound {
                    reference: reference.to_string(),
                    address: address.clone(),
                }
                .into()
            })
    }

    fn parameter(&self, tree: &Value, reference: &str, address: &Address) -> Result<String> {
        let found = self.lookup(tree, reference, address)?;
        tracing::trace!(%address, reference, found = %found.address, "Substituting reference");
        Ok(found.value.to_display_string())
    }

    fn inline_function(
        &self,
        tree: &mut Value,
        whole: &str,
        inner: &str,
        address: &Address,
    ) -> Result<String> {
        let Some(split) = inner.find([':', '=']) else {
            return Err(expression_failure(
                whole,
                address,
                ExprError::Syntax {
                    offset: 0,
                    message: "inline function needs ':' or '=' after its parameters".to_string(),
                },
            )
            .into());
        };
        let assign = inner[split..].starts_with('=');
        let body = inner[split + 1..].trim();
        let params: Vec<&str> = inner[..split]
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut bindings = Vec::with_capacity(params.len() * 2);
        let mut target = None;
        for (position, param) in params.iter().enumerate() {
            let found = self.lookup(tree, param, address)?;
            let value = EvalValue::from(found.value);
            if position == 0 {
                target = Some(found.address);
            }
            bindings.push((format!("p{}", position + 1), value.clone()));
            if is_identifier(param) {
                bindings.push((param.to_string(), value));
            }
        }

        let result = self
            .evaluator
            .evaluate_with(body, &bindings)
            .map_err(|source| expression_failure(whole, address, source))?;
        let rendered = result.to_string();

        if assign {
            let Some(target) = target else {
                return Err(expression_failure(
                    whole,
                    address,
                    ExprError::Syntax {
                        offset: split,
                        message: "'=' needs a parameter to assign to".to_string(),
                    },
                )
                .into());
            };
            tracing::debug!(%address, %target, "Inline function assigns its result");
            tree.write(&target, result.into_tree_value())?;
        }
        Ok(rendered)
    }

    fn raw_expression(&self, whole: &str, body: &str, address: &Address) -> Result<String> {
        let result = self
            .evaluator
            .evaluate(body.trim())
            .map_err(|source| expression_failure(whole, address, source))?;
        Ok(result.to_string())
    }
}
