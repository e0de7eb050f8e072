//! Linear mapping of a live source value onto a destination range.
//!
//! The persisted form is the fixed 23-term template
//!
//! ```text
//!  0 1 2  3   4   5    6 7 8   9    10  11   12 13 14 15  16   17  18   19 20 21  22
//!  ( ( ( src - srcMin  ) / ( srcMax  - srcMin ) )  *  ( dstMax - dstMin )  )  + dstMin
//! ```
//!
//! where `srcMin` appears at 5 and 11 and `dstMin` at 18 and 22. In memory
//! each bound is held once, so both occurrences always agree.

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::{ExpressionError, GrammarError};
use crate::grammar;
use crate::term::{Operator, Term, ValueRef};
use crate::unit::Quantity;

pub const LINKING_TERM_COUNT: usize = 23;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Op(Operator),
    Source,
    SourceLow,
    SourceHigh,
    DestinationLow,
    DestinationHigh,
}

const TEMPLATE: [Slot; LINKING_TERM_COUNT] = [
    Slot::Op(Operator::OpenParenthesis),
    Slot::Op(Operator::OpenParenthesis),
    Slot::Op(Operator::OpenParenthesis),
    Slot::Source,
    Slot::Op(Operator::Minus),
    Slot::SourceLow,
    Slot::Op(Operator::CloseParenthesis),
    Slot::Op(Operator::Divide),
    Slot::Op(Operator::OpenParenthesis),
    Slot::SourceHigh,
    Slot::Op(Operator::Minus),
    Slot::SourceLow,
    Slot::Op(Operator::CloseParenthesis),
    Slot::Op(Operator::CloseParenthesis),
    Slot::Op(Operator::Multiply),
    Slot::Op(Operator::OpenParenthesis),
    Slot::DestinationHigh,
    Slot::Op(Operator::Minus),
    Slot::DestinationLow,
    Slot::Op(Operator::CloseParenthesis),
    Slot::Op(Operator::CloseParenthesis),
    Slot::Op(Operator::Plus),
    Slot::DestinationLow,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLinking", into = "RawLinking")]
pub struct ValueLinkingExpression {
    source: Option<ValueRef>,
    source_low: Quantity,
    source_high: Quantity,
    destination_low: Quantity,
    destination_high: Quantity,
    inverse: bool,
}

#[derive(Serialize, Deserialize)]
struct RawLinking {
    terms: Vec<Term>,
    #[serde(default)]
    inverse: bool,
}

impl ValueLinkingExpression {
    /// Default template for a numeric destination: destination bounds from
    /// the constraint, source unset, source bounds zero.
    pub fn for_destination(destination: &Constraint) -> Result<Self, ExpressionError> {
        let (min, max, unit) = destination.numeric_bounds()?;
        Ok(ValueLinkingExpression {
            source: None,
            source_low: Quantity::ZERO,
            source_high: Quantity::ZERO,
            destination_low: Quantity::new(min, unit),
            destination_high: Quantity::new(max, unit),
            inverse: false,
        })
    }

    /// Rebuilds an expression from its 23-term form, checking the kind and
    /// operator at every position and that duplicated bounds agree.
    pub fn from_terms(terms: &[Term], inverse: bool) -> Result<Self, ExpressionError> {
        if terms.len() != LINKING_TERM_COUNT {
            return Err(ExpressionError::linking(format!(
                "expected {} terms, found {}",
                LINKING_TERM_COUNT,
                terms.len()
            )));
        }

        let mut source = None;
        let mut source_low: Option<Quantity> = None;
        let mut source_high = None;
        let mut destination_low: Option<Quantity> = None;
        let mut destination_high = None;

        for (i, (slot, term)) in TEMPLATE.iter().zip(terms).enumerate() {
            match (slot, term) {
                (Slot::Op(expected), Term::Operator(found)) if expected == found => {}
                (Slot::Source, Term::Value(v)) => source = v.clone(),
                (Slot::SourceLow, Term::Number(q)) => {
                    if source_low.is_some_and(|prev| prev != *q) {
                        return Err(ExpressionError::linking(format!(
                            "source minimum differs between positions 5 and {}",
                            i
                        )));
                    }
                    source_low = Some(*q);
                }
                (Slot::SourceHigh, Term::Number(q)) => source_high = Some(*q),
                (Slot::DestinationLow, Term::Number(q)) => {
                    if destination_low.is_some_and(|prev| prev != *q) {
                        return Err(ExpressionError::linking(format!(
                            "destination minimum differs between positions 18 and {}",
                            i
                        )));
                    }
                    destination_low = Some(*q);
                }
                (Slot::DestinationHigh, Term::Number(q)) => destination_high = Some(*q),
                (slot, term) => {
                    return Err(ExpressionError::linking(format!(
                        "position {} holds {} where {} is expected",
                        i,
                        term,
                        slot_name(*slot)
                    )))
                }
            }
        }

        match (source_low, source_high, destination_low, destination_high) {
            (Some(source_low), Some(source_high), Some(destination_low), Some(destination_high)) => {
                Ok(ValueLinkingExpression {
                    source,
                    source_low,
                    source_high,
                    destination_low,
                    destination_high,
                    inverse,
                })
            }
            _ => Err(ExpressionError::linking("template bounds missing")),
        }
    }

    pub fn terms(&self) -> Vec<Term> {
        TEMPLATE
            .iter()
            .map(|slot| match slot {
                Slot::Op(op) => Term::op(*op),
                Slot::Source => Term::Value(self.source.clone()),
                Slot::SourceLow => Term::Number(self.source_low),
                Slot::SourceHigh => Term::Number(self.source_high),
                Slot::DestinationLow => Term::Number(self.destination_low),
                Slot::DestinationHigh => Term::Number(self.destination_high),
            })
            .collect()
    }

    // ── Accessors ───────────────────────────────

    pub fn source(&self) -> Option<&ValueRef> {
        self.source.as_ref()
    }

    pub fn source_low(&self) -> Quantity {
        self.source_low
    }

    pub fn source_high(&self) -> Quantity {
        self.source_high
    }

    pub fn destination_low(&self) -> Quantity {
        self.destination_low
    }

    pub fn destination_high(&self) -> Quantity {
        self.destination_high
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    // ── Mutators ────────────────────────────────

    /// Points the expression at a new source. The source bounds move to the
    /// 25th and 75th percentile of the source's numeric range.
    pub fn set_source_value(
        &self,
        source: ValueRef,
        source_constraint: &Constraint,
    ) -> Result<Self, ExpressionError> {
        let (min, max, unit) = source_constraint.numeric_bounds()?;
        let at = |p: f64| Quantity::new((max - min) * p + min, unit);
        Ok(ValueLinkingExpression {
            source: Some(source),
            source_low: at(0.25),
            source_high: at(0.75),
            ..self.clone()
        })
    }

    pub fn set_source_low_value(&self, value: Quantity) -> Self {
        ValueLinkingExpression {
            source_low: value,
            ..self.clone()
        }
    }

    pub fn set_source_high_value(&self, value: Quantity) -> Self {
        ValueLinkingExpression {
            source_high: value,
            ..self.clone()
        }
    }

    pub fn set_destination_low_value(&self, value: Quantity) -> Self {
        ValueLinkingExpression {
            destination_low: value,
            ..self.clone()
        }
    }

    pub fn set_destination_high_value(&self, value: Quantity) -> Self {
        ValueLinkingExpression {
            destination_high: value,
            ..self.clone()
        }
    }

    pub fn set_inverse(&self, inverse: bool) -> Self {
        ValueLinkingExpression {
            inverse,
            ..self.clone()
        }
    }

    pub fn check(&self) -> Result<(), GrammarError> {
        grammar::check(&self.terms())
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

fn slot_name(slot: Slot) -> &'static str {
    match slot {
        Slot::Op(_) => "a fixed operator",
        Slot::Source => "the source value",
        Slot::SourceLow => "the source minimum",
        Slot::SourceHigh => "the source maximum",
        Slot::DestinationLow => "the destination minimum",
        Slot::DestinationHigh => "the destination maximum",
    }
}

impl TryFrom<RawLinking> for ValueLinkingExpression {
    type Error = ExpressionError;

    fn try_from(raw: RawLinking) -> Result<Self, Self::Error> {
        ValueLinkingExpression::from_terms(&raw.terms, raw.inverse)
    }
}

impl From<ValueLinkingExpression> for RawLinking {
    fn from(e: ValueLinkingExpression) -> Self {
        RawLinking {
            terms: e.terms(),
            inverse: e.inverse,
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;

    fn pwm() -> Constraint {
        Constraint::numeric(0.0, 255.0, Unit::Number)
    }

    fn light() -> Constraint {
        Constraint::numeric(0.0, 1000.0, Unit::Lux)
    }

    fn linked() -> ValueLinkingExpression {
        ValueLinkingExpression::for_destination(&pwm())
            .unwrap()
            .set_source_value(ValueRef::new("Light", "Intensity"), &light())
            .unwrap()
    }

    #[test]
    fn default_template_takes_destination_bounds() {
        let e = ValueLinkingExpression::for_destination(&pwm()).unwrap();
        let terms = e.terms();
        assert_eq!(terms.len(), LINKING_TERM_COUNT);
        assert_eq!(terms[16], Term::number(255.0, Unit::Number));
        assert_eq!(terms[18], Term::number(0.0, Unit::Number));
        assert_eq!(terms[22], terms[18]);
        assert_eq!(terms[3], Term::Value(None));
        assert!(!e.is_valid());
    }

    #[test]
    fn non_numeric_destination_is_rejected() {
        let err = ValueLinkingExpression::for_destination(&Constraint::categorical_strings(["a"]))
            .unwrap_err();
        assert!(matches!(err, ExpressionError::Constraint(_)));
    }

    #[test]
    fn source_value_sets_quartile_bounds() {
        let e = linked();
        assert_eq!(e.source_low(), Quantity::new(250.0, Unit::Lux));
        assert_eq!(e.source_high(), Quantity::new(750.0, Unit::Lux));
        let terms = e.terms();
        assert_eq!(terms[5], terms[11]);
        assert!(e.is_valid());
    }

    #[test]
    fn destination_low_writes_both_positions() {
        let v = Quantity::new(10.0, Unit::Number);
        let e = linked().set_destination_low_value(v);
        let terms = e.terms();
        assert_eq!(terms[18], Term::Number(v));
        assert_eq!(terms[22], Term::Number(v));
        assert_eq!(linked().destination_low(), Quantity::new(0.0, Unit::Number));
    }

    #[test]
    fn round_trips_through_terms() {
        let e = linked().set_inverse(true);
        let back = ValueLinkingExpression::from_terms(&e.terms(), true).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn mismatched_source_minimum_is_rejected() {
        let mut terms = linked().terms();
        terms[11] = Term::number(1.0, Unit::Lux);
        let err = ValueLinkingExpression::from_terms(&terms, false).unwrap_err();
        assert!(matches!(err, ExpressionError::InvalidLinkingShape { .. }));
    }

    #[test]
    fn mismatched_destination_minimum_is_rejected() {
        let mut terms = linked().terms();
        terms[22] = Term::number(1.0, Unit::Number);
        assert!(matches!(
            ValueLinkingExpression::from_terms(&terms, false),
            Err(ExpressionError::InvalidLinkingShape { .. })
        ));
    }

    #[test]
    fn wrong_operator_or_length_is_rejected() {
        let mut terms = linked().terms();
        terms[7] = Term::op(Operator::Multiply);
        assert!(ValueLinkingExpression::from_terms(&terms, false).is_err());
        assert!(ValueLinkingExpression::from_terms(&terms[..22], false).is_err());
    }

    #[test]
    fn persisted_form_is_validated() {
        let e = linked().set_inverse(true);
        let mut v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["inverse"], serde_json::json!(true));
        assert_eq!(v["terms"].as_array().unwrap().len(), 23);
        let back: ValueLinkingExpression = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(back, e);

        v["terms"][5] = serde_json::json!({"type": "NUMBER", "value": {"value": 3.0, "unit": "LUX"}});
        assert!(serde_json::from_value::<ValueLinkingExpression>(v).is_err());
    }
}
