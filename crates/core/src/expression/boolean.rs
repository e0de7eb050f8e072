//! AND-joined comparison entries.
//!
//! Entries are the source of truth. The flat term list is rendered as
//! `( lhs cmp rhs ) and ( lhs cmp rhs ) ...` and parsed back by
//! [`terms_to_entries`]; the two are inverse on well-formed input.

use serde::{Deserialize, Serialize};

use super::{CustomNumberExpression, TermList};
use crate::error::{ExpressionError, GrammarError};
use crate::grammar;
use crate::term::{Operator, Term};

/// The operators an entry may compare with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equal,
    NotEqual,
}

impl Comparison {
    pub fn operator(self) -> Operator {
        match self {
            Comparison::GreaterThan => Operator::GreaterThan,
            Comparison::LessThan => Operator::LessThan,
            Comparison::GreaterThanOrEqual => Operator::GreaterThanOrEqual,
            Comparison::LessThanOrEqual => Operator::LessThanOrEqual,
            Comparison::Equal => Operator::Equal,
            Comparison::NotEqual => Operator::NotEqual,
        }
    }

    pub fn from_operator(op: Operator) -> Option<Self> {
        Some(match op {
            Operator::GreaterThan => Comparison::GreaterThan,
            Operator::LessThan => Comparison::LessThan,
            Operator::GreaterThanOrEqual => Comparison::GreaterThanOrEqual,
            Operator::LessThanOrEqual => Comparison::LessThanOrEqual,
            Operator::Equal => Comparison::Equal,
            Operator::NotEqual => Comparison::NotEqual,
            _ => return None,
        })
    }

    /// Applies the comparison with IEEE 754 semantics.
    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::GreaterThan => left > right,
            Comparison::LessThan => left < right,
            Comparison::GreaterThanOrEqual => left >= right,
            Comparison::LessThanOrEqual => left <= right,
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
        }
    }
}

/// One `lhs cmp rhs` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub lhs: CustomNumberExpression,
    pub op: Comparison,
    pub rhs: CustomNumberExpression,
}

impl Entry {
    pub fn new(lhs: CustomNumberExpression, op: Comparison, rhs: CustomNumberExpression) -> Self {
        Entry { lhs, op, rhs }
    }

    /// The placeholder clause `( _ < _ )` with both sides empty.
    pub fn empty() -> Self {
        Entry::new(
            CustomNumberExpression::default(),
            Comparison::LessThan,
            CustomNumberExpression::default(),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.lhs.is_valid() && self.rhs.is_valid()
    }
}

/// Renders entries as a flat term list.
pub fn entries_to_terms(entries: &[Entry]) -> Vec<Term> {
    let mut terms = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            terms.push(Term::op(Operator::And));
        }
        terms.push(Term::op(Operator::OpenParenthesis));
        terms.extend(entry.lhs.terms().iter().cloned());
        terms.push(Term::op(entry.op.operator()));
        terms.extend(entry.rhs.terms().iter().cloned());
        terms.push(Term::op(Operator::CloseParenthesis));
    }
    terms
}

/// Parses a flat term list back into entries.
///
/// The list is split on `and` at nesting depth zero. Each segment must be
/// wrapped in one pair of parentheses and hold exactly one comparison
/// operator directly inside them.
pub fn terms_to_entries(terms: &[Term]) -> Result<Vec<Entry>, ExpressionError> {
    let mut entries = Vec::new();
    if terms.is_empty() {
        return Ok(entries);
    }

    let mut depth: i64 = 0;
    let mut start = 0;
    for (i, term) in terms.iter().enumerate() {
        match term.as_operator() {
            Some(Operator::OpenParenthesis) => depth += 1,
            Some(Operator::CloseParenthesis) => {
                depth -= 1;
                if depth < 0 {
                    return Err(ExpressionError::entry(format!(
                        "unmatched ')' at position {}",
                        i
                    )));
                }
            }
            Some(Operator::And) if depth == 0 => {
                entries.push(parse_entry(&terms[start..i], start)?);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(parse_entry(&terms[start..], start)?);
    Ok(entries)
}

fn parse_entry(segment: &[Term], offset: usize) -> Result<Entry, ExpressionError> {
    if segment.len() < 3 {
        return Err(ExpressionError::entry(format!(
            "entry at position {} is too short",
            offset
        )));
    }
    let last = segment.len() - 1;
    if !segment[0].is_operator(Operator::OpenParenthesis)
        || !segment[last].is_operator(Operator::CloseParenthesis)
    {
        return Err(ExpressionError::entry(format!(
            "entry at position {} is not wrapped in parentheses",
            offset
        )));
    }

    let inner = &segment[1..last];
    let mut depth: i64 = 0;
    let mut comparison: Option<(usize, Comparison)> = None;
    for (i, term) in inner.iter().enumerate() {
        match term.as_operator() {
            Some(Operator::OpenParenthesis) => depth += 1,
            Some(Operator::CloseParenthesis) => {
                depth -= 1;
                if depth < 0 {
                    return Err(ExpressionError::entry(format!(
                        "entry at position {} closes its wrapping parenthesis early",
                        offset
                    )));
                }
            }
            Some(op) if depth == 0 => {
                if let Some(cmp) = Comparison::from_operator(op) {
                    if comparison.is_some() {
                        return Err(ExpressionError::entry(format!(
                            "entry at position {} has more than one comparison",
                            offset
                        )));
                    }
                    comparison = Some((i, cmp));
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ExpressionError::entry(format!(
            "entry at position {} has unbalanced parentheses",
            offset
        )));
    }

    let (at, op) = comparison.ok_or_else(|| {
        ExpressionError::entry(format!("entry at position {} has no comparison", offset))
    })?;
    Ok(Entry::new(
        CustomNumberExpression::new(inner[..at].to_vec()),
        op,
        CustomNumberExpression::new(inner[at + 1..].to_vec()),
    ))
}

// ──────────────────────────────────────────────
// BooleanExpression
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TermList", into = "TermList")]
pub struct BooleanExpression {
    entries: Vec<Entry>,
}

impl Default for BooleanExpression {
    fn default() -> Self {
        BooleanExpression::new()
    }
}

impl BooleanExpression {
    /// A single placeholder entry.
    pub fn new() -> Self {
        BooleanExpression {
            entries: vec![Entry::empty()],
        }
    }

    pub fn from_entries(entries: Vec<Entry>) -> Self {
        BooleanExpression { entries }
    }

    pub fn from_terms(terms: &[Term]) -> Result<Self, ExpressionError> {
        Ok(BooleanExpression {
            entries: terms_to_entries(terms)?,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn terms(&self) -> Vec<Term> {
        entries_to_terms(&self.entries)
    }

    pub fn with_entry(&self, entry: Entry) -> Self {
        let mut entries = self.entries.clone();
        entries.push(entry);
        BooleanExpression { entries }
    }

    pub fn with_entry_at(&self, index: usize, entry: Entry) -> Option<Self> {
        let mut entries = self.entries.clone();
        *entries.get_mut(index)? = entry;
        Some(BooleanExpression { entries })
    }

    pub fn without_entry(&self, index: usize) -> Option<Self> {
        if index >= self.entries.len() {
            return None;
        }
        let mut entries = self.entries.clone();
        entries.remove(index);
        Some(BooleanExpression { entries })
    }

    /// Valid when there is at least one entry and both sides of every
    /// entry are well-formed arithmetic. Positions refer to [`Self::terms`].
    pub fn check(&self) -> Result<(), ExpressionError> {
        if self.entries.is_empty() {
            return Err(GrammarError::Empty.into());
        }
        let mut position = 0;
        for entry in &self.entries {
            let lhs_at = position + 1;
            let rhs_at = lhs_at + entry.lhs.terms().len() + 1;
            grammar::check_at(entry.lhs.terms(), lhs_at)?;
            grammar::check_at(entry.rhs.terms(), rhs_at)?;
            // `( lhs op rhs ) and`
            position = rhs_at + entry.rhs.terms().len() + 2;
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

impl TryFrom<TermList> for BooleanExpression {
    type Error = ExpressionError;

    fn try_from(list: TermList) -> Result<Self, Self::Error> {
        BooleanExpression::from_terms(&list.terms)
    }
}

impl From<BooleanExpression> for TermList {
    fn from(e: BooleanExpression) -> Self {
        TermList { terms: e.terms() }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    fn n(v: f64) -> Term {
        Term::number(v, Unit::Celsius)
    }

    fn temp() -> Term {
        Term::value("Sensor", "Temperature")
    }

    fn op(o: Operator) -> Term {
        Term::op(o)
    }

    fn two_entry_terms() -> Vec<Term> {
        vec![
            op(Operator::OpenParenthesis),
            temp(),
            op(Operator::GreaterThan),
            n(20.0),
            op(Operator::CloseParenthesis),
            op(Operator::And),
            op(Operator::OpenParenthesis),
            op(Operator::OpenParenthesis),
            temp(),
            op(Operator::Plus),
            n(1.0),
            op(Operator::CloseParenthesis),
            op(Operator::LessThanOrEqual),
            n(30.0),
            op(Operator::CloseParenthesis),
        ]
    }

    #[test]
    fn parses_entries_split_on_top_level_and() {
        let entries = terms_to_entries(&two_entry_terms()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].op, Comparison::GreaterThan);
        assert_eq!(entries[0].lhs.terms(), &[temp()]);
        assert_eq!(entries[1].op, Comparison::LessThanOrEqual);
        assert_eq!(entries[1].lhs.terms().len(), 5);
        assert_eq!(entries[1].rhs.terms(), &[n(30.0)]);
    }

    #[test]
    fn round_trip_reproduces_terms() {
        let terms = two_entry_terms();
        assert_eq!(entries_to_terms(&terms_to_entries(&terms).unwrap()), terms);
    }

    #[test]
    fn placeholder_entry_round_trips() {
        let e = BooleanExpression::new();
        let terms = e.terms();
        assert_eq!(
            terms,
            vec![
                op(Operator::OpenParenthesis),
                op(Operator::LessThan),
                op(Operator::CloseParenthesis)
            ]
        );
        assert_eq!(BooleanExpression::from_terms(&terms).unwrap(), e);
        assert!(!e.is_valid());
    }

    #[test]
    fn rejects_missing_parentheses() {
        let terms = vec![temp(), op(Operator::GreaterThan), n(1.0)];
        assert!(matches!(
            terms_to_entries(&terms),
            Err(ExpressionError::MalformedEntry { .. })
        ));
    }

    #[test]
    fn rejects_two_comparisons() {
        let terms = vec![
            op(Operator::OpenParenthesis),
            temp(),
            op(Operator::GreaterThan),
            n(1.0),
            op(Operator::LessThan),
            n(2.0),
            op(Operator::CloseParenthesis),
        ];
        assert!(matches!(
            terms_to_entries(&terms),
            Err(ExpressionError::MalformedEntry { .. })
        ));
    }

    #[test]
    fn rejects_dangling_and() {
        let mut terms = two_entry_terms();
        terms.push(op(Operator::And));
        assert!(terms_to_entries(&terms).is_err());
    }

    #[test]
    fn rejects_segment_closed_early() {
        // ( a > 1 ) ( 2 )  reads as one segment whose wrapper closes early
        let terms = vec![
            op(Operator::OpenParenthesis),
            temp(),
            op(Operator::GreaterThan),
            n(1.0),
            op(Operator::CloseParenthesis),
            op(Operator::OpenParenthesis),
            n(2.0),
            op(Operator::CloseParenthesis),
        ];
        assert!(terms_to_entries(&terms).is_err());
    }

    #[test]
    fn validity_reports_position_in_rendered_terms() {
        let e = BooleanExpression::from_entries(vec![
            Entry::new(vec![temp()].into(), Comparison::Equal, vec![n(1.0)].into()),
            Entry::new(vec![temp(), temp()].into(), Comparison::Equal, vec![n(1.0)].into()),
        ]);
        // entry 0 spans positions 0..=4, `and` is 5, entry 1 opens at 6
        let err = e.check().unwrap_err();
        assert_eq!(
            err,
            ExpressionError::MalformedExpression(GrammarError::UnexpectedTerm {
                position: 8,
                after: "an operand",
                found: "an operand",
            })
        );
    }

    #[test]
    fn persisted_form_is_terms() {
        let e = BooleanExpression::from_terms(&two_entry_terms()).unwrap();
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["terms"].as_array().unwrap().len(), 15);
        let back: BooleanExpression = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }
}
