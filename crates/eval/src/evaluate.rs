//! Live evaluation of every expression kind.
//!
//! [`evaluate`] is the single entry point; it matches on the expression
//! discriminant and hands off to the per-kind functions below, which are
//! public for callers that already hold a specialization.

use std::fmt;

use gizmo_core::{
    BooleanExpression, ComplexStringExpression, CustomNumberExpression, Expression,
    NumberInRangeExpression, StringPart, ValueLinkingExpression,
};

use crate::error::EvalError;
use crate::interpreter::{evaluate_terms, resolve, EvalOptions};
use crate::live::ValueLookup;

/// Result of evaluating an expression against live values.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Integer(i64),
}

impl LiveValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiveValue::Number(v) => Some(*v),
            LiveValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

/// Numbers print in shortest round-trip form with at least one fractional
/// digit (`12.0`, `0.1`); booleans print as `1` or `0`, the same encoding
/// devices use for conditions.
impl fmt::Display for LiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveValue::Number(v) => write!(f, "{:?}", v),
            LiveValue::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            LiveValue::Text(s) => f.write_str(s),
            LiveValue::Integer(i) => write!(f, "{}", i),
        }
    }
}

pub fn evaluate<L>(
    expression: &Expression,
    lookup: &L,
    options: &EvalOptions,
) -> Result<LiveValue, EvalError>
where
    L: ValueLookup + ?Sized,
{
    let value = match expression {
        Expression::CustomNumber(e) => LiveValue::Number(evaluate_number(e, lookup, options)?),
        Expression::Boolean(e) => LiveValue::Bool(evaluate_boolean(e, lookup, options)?),
        Expression::ComplexString(e) => LiveValue::Text(render_string(e, lookup, options)?),
        Expression::ValueLinking(e) => LiveValue::Number(evaluate_linking(e, lookup, options)?),
        Expression::NumberInRange(e) => {
            LiveValue::Bool(evaluate_number_in_range(e, lookup, options)?)
        }
        Expression::NumberWithUnit(e) => LiveValue::Number(e.value.value),
        Expression::SimpleString(e) => LiveValue::Text(e.value.clone()),
        Expression::SimpleInteger(e) => LiveValue::Integer(e.value),
        Expression::ProjectValue(e) => match &e.value {
            Some(v) => LiveValue::Number(resolve(v, lookup)?),
            None => {
                return Err(EvalError::MalformedExpression {
                    message: "no value selected".to_string(),
                })
            }
        },
    };
    tracing::debug!(kind = ?expression.expression_type(), %value, "evaluated");
    Ok(value)
}

pub fn evaluate_number<L>(
    expression: &CustomNumberExpression,
    lookup: &L,
    options: &EvalOptions,
) -> Result<f64, EvalError>
where
    L: ValueLookup + ?Sized,
{
    evaluate_terms(expression.terms(), lookup, options)
}

/// True when every entry's comparison holds. Entries are evaluated in
/// order and evaluation stops at the first that fails.
pub fn evaluate_boolean<L>(
    expression: &BooleanExpression,
    lookup: &L,
    options: &EvalOptions,
) -> Result<bool, EvalError>
where
    L: ValueLookup + ?Sized,
{
    expression.check()?;
    for entry in expression.entries() {
        let left = evaluate_terms(entry.lhs.terms(), lookup, options)?;
        let right = evaluate_terms(entry.rhs.terms(), lookup, options)?;
        if !entry.op.holds(left, right) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Concatenates literals with the values of the numeric runs between them.
pub fn render_string<L>(
    expression: &ComplexStringExpression,
    lookup: &L,
    options: &EvalOptions,
) -> Result<String, EvalError>
where
    L: ValueLookup + ?Sized,
{
    expression.check()?;
    let mut out = String::new();
    for part in expression.sub_expressions() {
        match part {
            StringPart::Literal(s) => out.push_str(&s),
            StringPart::Number(e) => {
                let v = evaluate_number(&e, lookup, options)?;
                out.push_str(&LiveValue::Number(v).to_string());
            }
        }
    }
    Ok(out)
}

/// Maps the source onto the destination range, clamped to that range.
/// An inverse link mirrors the result inside the destination range.
pub fn evaluate_linking<L>(
    expression: &ValueLinkingExpression,
    lookup: &L,
    options: &EvalOptions,
) -> Result<f64, EvalError>
where
    L: ValueLookup + ?Sized,
{
    let mapped = evaluate_terms(&expression.terms(), lookup, options)?;
    let low = expression.destination_low().value;
    let high = expression.destination_high().value;
    let value = if expression.is_inverse() {
        low + high - mapped
    } else {
        mapped
    };
    Ok(value.clamp(low.min(high), low.max(high)))
}

pub fn evaluate_number_in_range<L>(
    expression: &NumberInRangeExpression,
    lookup: &L,
    _options: &EvalOptions,
) -> Result<bool, EvalError>
where
    L: ValueLookup + ?Sized,
{
    let v = resolve(expression.source(), lookup)?;
    Ok(expression.high_operator().holds(v, expression.high_value())
        && expression.low_operator().holds(v, expression.low_value()))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
