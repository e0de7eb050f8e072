//! Two-stack evaluation of infix term lists.
//!
//! Operands go on one stack, pending operators on the other. Before a
//! binary operator is pushed, every pending operator of greater or equal
//! precedence is applied, so chains of one precedence associate to the
//! left. `not` is a prefix operator and is never drained by another `not`.
//!
//! Comparisons and logical operators yield `1.0` or `0.0`; any non-zero
//! operand is true.

use serde::Deserialize;

use gizmo_core::{grammar, Operator, Term, ValueRef};

use crate::error::EvalError;
use crate::live::ValueLookup;

/// Interpreter limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Longest term list accepted.
    pub max_terms: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions { max_terms: 1024 }
    }
}

fn precedence(op: Operator) -> u8 {
    match op {
        Operator::Not => 7,
        Operator::Multiply | Operator::Divide | Operator::Mod => 6,
        Operator::Plus | Operator::Minus => 5,
        Operator::GreaterThan
        | Operator::LessThan
        | Operator::GreaterThanOrEqual
        | Operator::LessThanOrEqual => 4,
        Operator::Equal | Operator::NotEqual => 3,
        Operator::And => 2,
        Operator::Or => 1,
        Operator::OpenParenthesis | Operator::CloseParenthesis => 0,
    }
}

fn truth(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Evaluates a term list against live values.
///
/// The list is validated first; evaluation never starts on malformed
/// input.
pub fn evaluate_terms<L>(terms: &[Term], lookup: &L, options: &EvalOptions) -> Result<f64, EvalError>
where
    L: ValueLookup + ?Sized,
{
    if terms.len() > options.max_terms {
        return Err(EvalError::TooManyTerms {
            limit: options.max_terms,
            found: terms.len(),
        });
    }
    grammar::check(terms)?;

    let mut operands: Vec<f64> = Vec::with_capacity(terms.len());
    let mut operators: Vec<Operator> = Vec::new();

    for term in terms {
        match term {
            Term::Operator(prefix @ (Operator::OpenParenthesis | Operator::Not)) => {
                operators.push(*prefix);
            }
            Term::Operator(Operator::CloseParenthesis) => loop {
                match operators.last() {
                    Some(Operator::OpenParenthesis) => {
                        operators.pop();
                        break;
                    }
                    Some(_) => reduce(&mut operands, &mut operators)?,
                    None => {
                        return Err(EvalError::MalformedExpression {
                            message: "unmatched ')'".to_string(),
                        })
                    }
                }
            },
            Term::Operator(op) => {
                while let Some(top) = operators.last() {
                    if *top == Operator::OpenParenthesis || precedence(*top) < precedence(*op) {
                        break;
                    }
                    reduce(&mut operands, &mut operators)?;
                }
                operators.push(*op);
            }
            operand => operands.push(operand_value(operand, lookup)?),
        }
    }

    while !operators.is_empty() {
        reduce(&mut operands, &mut operators)?;
    }

    match operands.as_slice() {
        [value] => Ok(*value),
        other => Err(EvalError::MalformedExpression {
            message: format!("expected one result, {} operands left", other.len()),
        }),
    }
}

fn operand_value<L>(term: &Term, lookup: &L) -> Result<f64, EvalError>
where
    L: ValueLookup + ?Sized,
{
    match term {
        Term::Number(q) => Ok(q.value),
        Term::Integer(i) => Ok(*i as f64),
        Term::Value(Some(v)) => resolve(v, lookup),
        other => Err(EvalError::not_numeric(other.kind())),
    }
}

pub(crate) fn resolve<L>(value: &ValueRef, lookup: &L) -> Result<f64, EvalError>
where
    L: ValueLookup + ?Sized,
{
    lookup
        .lookup(value)
        .ok_or_else(|| EvalError::UnresolvedReference {
            device: value.device.clone(),
            property: value.property.clone(),
        })
}

/// Pops one operator and applies it. Binary operators pop `right` before
/// `left`.
fn reduce(operands: &mut Vec<f64>, operators: &mut Vec<Operator>) -> Result<(), EvalError> {
    let op = operators.pop().ok_or_else(|| EvalError::MalformedExpression {
        message: "operator stack underflow".to_string(),
    })?;
    let underflow = || EvalError::MalformedExpression {
        message: format!("missing operand for '{}'", op),
    };

    if op == Operator::Not {
        let v = operands.pop().ok_or_else(underflow)?;
        operands.push(truth(v == 0.0));
        return Ok(());
    }

    let right = operands.pop().ok_or_else(underflow)?;
    let left = operands.pop().ok_or_else(underflow)?;
    let result = match op {
        Operator::Plus => left + right,
        Operator::Minus => left - right,
        Operator::Multiply => left * right,
        Operator::Divide | Operator::Mod if right == 0.0 => {
            return Err(EvalError::DivisionByZero)
        }
        Operator::Divide => left / right,
        Operator::Mod => left % right,
        Operator::GreaterThan => truth(left > right),
        Operator::LessThan => truth(left < right),
        Operator::GreaterThanOrEqual => truth(left >= right),
        Operator::LessThanOrEqual => truth(left <= right),
        Operator::Equal => truth(left == right),
        Operator::NotEqual => truth(left != right),
        Operator::And => truth(left != 0.0 && right != 0.0),
        Operator::Or => truth(left != 0.0 || right != 0.0),
        Operator::Not | Operator::OpenParenthesis | Operator::CloseParenthesis => {
            return Err(EvalError::MalformedExpression {
                message: "unbalanced parentheses".to_string(),
            })
        }
    };
    tracing::trace!(%op, left, right, result, "reduced");
    operands.push(result);
    Ok(())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
