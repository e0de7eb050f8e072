//! Structural validation of infix term sequences.
//!
//! Each term falls into one of four categories: operand, operator, open
//! parenthesis or close parenthesis. A sequence is well formed when
//!
//! * it is non-empty and every term is individually valid,
//! * parentheses balance, never closing more than are open,
//! * no forbidden pair of neighbours occurs (operand after operand or
//!   after `)`, `(` after an operand or `)`, an operator after an operator
//!   or `(`, `)` after an operator or `(`),
//! * it does not start with a binary operator or `)` and does not end
//!   with an operator or `(`.
//!
//! Unary `not` is the one operator allowed at the start, after `(`, and
//! after a binary operator; it must be followed by an operand or `(`.

use crate::error::GrammarError;
use crate::term::{Operator, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Operand,
    Operator,
    Open,
    Close,
}

impl Category {
    fn of(term: &Term) -> Category {
        match term {
            Term::Operator(Operator::OpenParenthesis) => Category::Open,
            Term::Operator(Operator::CloseParenthesis) => Category::Close,
            Term::Operator(_) => Category::Operator,
            _ => Category::Operand,
        }
    }
}

fn describe(term: &Term) -> &'static str {
    match term {
        Term::Operator(Operator::OpenParenthesis) => "'('",
        Term::Operator(Operator::CloseParenthesis) => "')'",
        Term::Operator(Operator::Not) => "'not'",
        Term::Operator(_) => "an operator",
        _ => "an operand",
    }
}

/// Checks a flat term sequence.
pub fn check(terms: &[Term]) -> Result<(), GrammarError> {
    check_at(terms, 0)
}

pub fn is_valid(terms: &[Term]) -> bool {
    check(terms).is_ok()
}

/// Checks a sequence whose first term sits at `offset` in a larger list,
/// so reported positions refer to the larger list.
pub(crate) fn check_at(terms: &[Term], offset: usize) -> Result<(), GrammarError> {
    let (first, last) = match (terms.first(), terms.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(GrammarError::Empty),
    };

    if let Some(position) = terms.iter().position(|t| !t.is_valid()) {
        return Err(GrammarError::InvalidTerm {
            position: offset + position,
        });
    }

    match first {
        Term::Operator(op) if op.is_binary() => {
            return Err(GrammarError::BadStart {
                found: describe(first),
            })
        }
        Term::Operator(Operator::CloseParenthesis) => {
            return Err(GrammarError::BadStart {
                found: describe(first),
            })
        }
        _ => {}
    }

    let mut depth: usize = 0;
    for (i, term) in terms.iter().enumerate() {
        match Category::of(term) {
            Category::Open => depth += 1,
            Category::Close => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(GrammarError::UnmatchedClose { position: offset + i })?;
            }
            _ => {}
        }

        if i == 0 {
            continue;
        }
        let prev = &terms[i - 1];
        if !allowed_pair(prev, term) {
            return Err(GrammarError::UnexpectedTerm {
                position: offset + i,
                after: describe(prev),
                found: describe(term),
            });
        }
    }

    if matches!(Category::of(last), Category::Operator | Category::Open) {
        return Err(GrammarError::BadEnd {
            found: describe(last),
        });
    }
    if depth != 0 {
        return Err(GrammarError::Unclosed { open: depth });
    }
    Ok(())
}

fn allowed_pair(prev: &Term, next: &Term) -> bool {
    let (before, after) = (Category::of(prev), Category::of(next));
    let prev_not = prev.is_operator(Operator::Not);

    if next.is_operator(Operator::Not) {
        return before == Category::Open || (before == Category::Operator && !prev_not);
    }
    if prev_not {
        return matches!(after, Category::Operand | Category::Open);
    }

    !matches!(
        (before, after),
        (Category::Operand, Category::Operand)
            | (Category::Operand, Category::Open)
            | (Category::Operator, Category::Operator)
            | (Category::Operator, Category::Close)
            | (Category::Open, Category::Operator)
            | (Category::Open, Category::Close)
            | (Category::Close, Category::Operand)
            | (Category::Close, Category::Open)
    )
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
