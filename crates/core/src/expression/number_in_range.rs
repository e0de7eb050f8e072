use serde::{Deserialize, Serialize};

use super::{Comparison, TermList};
use crate::constraint::Constraint;
use crate::error::{ExpressionError, GrammarError};
use crate::grammar;
use crate::term::{Operator, Term, ValueRef};
use crate::unit::{Quantity, Unit};

/// `value <= high and value >= low` over one live value.
///
/// Both bounds share a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TermList", into = "TermList")]
pub struct NumberInRangeExpression {
    source: ValueRef,
    high_operator: Comparison,
    high: f64,
    low_operator: Comparison,
    low: f64,
    unit: Unit,
}

impl NumberInRangeExpression {
    /// Bounds start at the 25th and 75th percentile of the source range.
    pub fn new(source: ValueRef, constraint: &Constraint) -> Result<Self, ExpressionError> {
        let (min, max, unit) = constraint.numeric_bounds()?;
        Ok(NumberInRangeExpression {
            source,
            high_operator: Comparison::LessThanOrEqual,
            high: (max - min) * 0.75 + min,
            low_operator: Comparison::GreaterThanOrEqual,
            low: (max - min) * 0.25 + min,
            unit,
        })
    }

    pub fn terms(&self) -> Vec<Term> {
        vec![
            Term::Value(Some(self.source.clone())),
            Term::op(self.high_operator.operator()),
            Term::number(self.high, self.unit),
            Term::op(Operator::And),
            Term::Value(Some(self.source.clone())),
            Term::op(self.low_operator.operator()),
            Term::number(self.low, self.unit),
        ]
    }

    pub fn source(&self) -> &ValueRef {
        &self.source
    }

    pub fn low_value(&self) -> f64 {
        self.low
    }

    pub fn high_value(&self) -> f64 {
        self.high
    }

    pub fn low_operator(&self) -> Comparison {
        self.low_operator
    }

    pub fn high_operator(&self) -> Comparison {
        self.high_operator
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn low(&self) -> Quantity {
        Quantity::new(self.low, self.unit)
    }

    pub fn high(&self) -> Quantity {
        Quantity::new(self.high, self.unit)
    }

    pub fn set_low_value(&self, low: f64) -> Self {
        NumberInRangeExpression { low, ..self.clone() }
    }

    pub fn set_high_value(&self, high: f64) -> Self {
        NumberInRangeExpression {
            high,
            ..self.clone()
        }
    }

    pub fn set_low_operator(&self, low_operator: Comparison) -> Self {
        NumberInRangeExpression {
            low_operator,
            ..self.clone()
        }
    }

    pub fn set_high_operator(&self, high_operator: Comparison) -> Self {
        NumberInRangeExpression {
            high_operator,
            ..self.clone()
        }
    }

    /// Re-tags both bounds; the numbers are kept as they are.
    pub fn set_unit(&self, unit: Unit) -> Self {
        NumberInRangeExpression {
            unit,
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

impl TryFrom<TermList> for NumberInRangeExpression {
    type Error = ExpressionError;

    fn try_from(list: TermList) -> Result<Self, Self::Error> {
        match list.terms.as_slice() {
            [Term::Value(Some(a)), Term::Operator(hi_op), Term::Number(hi), Term::Operator(Operator::And), Term::Value(Some(b)), Term::Operator(lo_op), Term::Number(lo)] =>
            {
                if a != b {
                    return Err(ExpressionError::entry(format!(
                        "range compares two different values: {} and {}",
                        a, b
                    )));
                }
                if hi.unit != lo.unit {
                    return Err(ExpressionError::entry(format!(
                        "range bounds use different units: {} and {}",
                        hi.unit, lo.unit
                    )));
                }
                let comparison = |op: &Operator| {
                    Comparison::from_operator(*op).ok_or_else(|| {
                        ExpressionError::entry(format!("'{}' is not a comparison", op))
                    })
                };
                Ok(NumberInRangeExpression {
                    source: a.clone(),
                    high_operator: comparison(hi_op)?,
                    high: hi.value,
                    low_operator: comparison(lo_op)?,
                    low: lo.value,
                    unit: hi.unit,
                })
            }
            _ => Err(ExpressionError::entry(
                "expected `value op high and value op low`",
            )),
        }
    }
}

impl From<NumberInRangeExpression> for TermList {
    fn from(e: NumberInRangeExpression) -> Self {
        TermList { terms: e.terms() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance() -> NumberInRangeExpression {
        NumberInRangeExpression::new(
            ValueRef::new("Ultrasonic", "Distance"),
            &Constraint::numeric(0.0, 400.0, Unit::Centimeter),
        )
        .unwrap()
    }

    #[test]
    fn defaults_to_middle_half() {
        let e = distance();
        assert_eq!(e.low_value(), 100.0);
        assert_eq!(e.high_value(), 300.0);
        assert_eq!(e.unit(), Unit::Centimeter);
        let terms = e.terms();
        assert_eq!(terms.len(), 7);
        assert_eq!(terms[1], Term::op(Operator::LessThanOrEqual));
        assert_eq!(terms[5], Term::op(Operator::GreaterThanOrEqual));
        assert!(e.is_valid());
    }

    #[test]
    fn setters_return_new_values() {
        let e = distance();
        let changed = e
            .set_low_value(5.0)
            .set_high_operator(Comparison::LessThan)
            .set_unit(Unit::Meter);
        assert_eq!(changed.low(), Quantity::new(5.0, Unit::Meter));
        assert_eq!(changed.terms()[1], Term::op(Operator::LessThan));
        assert_eq!(e.low_value(), 100.0);
    }

    #[test]
    fn persisted_form_round_trips() {
        let e = distance().set_high_value(250.0);
        let v = serde_json::to_value(&e).unwrap();
        let back: NumberInRangeExpression = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn rejects_foreign_shapes() {
        let mut terms = distance().terms();
        terms[4] = Term::value("Ultrasonic", "Other");
        assert!(NumberInRangeExpression::try_from(TermList { terms }).is_err());

        let mut terms = distance().terms();
        terms[5] = Term::op(Operator::Plus);
        assert!(NumberInRangeExpression::try_from(TermList { terms }).is_err());
    }

    #[test]
    fn requires_numeric_source() {
        assert!(NumberInRangeExpression::new(
            ValueRef::new("Button", "State"),
            &Constraint::categorical_ints([0, 1]),
        )
        .is_err());
    }
}
