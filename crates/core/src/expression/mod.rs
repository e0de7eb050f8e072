//! Expressions: ordered term sequences owned by one specialization.
//!
//! Every specialization is an immutable value. Mutators return a new
//! expression and leave the receiver untouched, so an editor can keep the
//! old value around and diff.

mod boolean;
mod complex_string;
mod custom_number;
mod number_in_range;
mod simple;
mod value_linking;

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ExpressionError, GrammarError};
use crate::term::{Term, ValueRef};
use crate::unit::Quantity;

pub use boolean::{entries_to_terms, terms_to_entries, BooleanExpression, Comparison, Entry};
pub use complex_string::{ComplexStringExpression, StringPart};
pub use custom_number::CustomNumberExpression;
pub use number_in_range::NumberInRangeExpression;
pub use simple::{
    NumberWithUnitExpression, ProjectValueExpression, SimpleIntegerExpression,
    SimpleStringExpression,
};
pub use value_linking::{ValueLinkingExpression, LINKING_TERM_COUNT};

/// Discriminant of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    CustomNumber,
    Boolean,
    ComplexString,
    ValueLinking,
    NumberInRange,
    NumberWithUnit,
    SimpleString,
    SimpleInteger,
    ProjectValue,
}

impl ExpressionType {
    /// The `type` discriminator used in persisted documents.
    pub fn name(self) -> &'static str {
        match self {
            ExpressionType::CustomNumber => "CUSTOM_NUMBER",
            ExpressionType::Boolean => "BOOLEAN",
            ExpressionType::ComplexString => "COMPLEX_STRING",
            ExpressionType::ValueLinking => "VALUE_LINKING",
            ExpressionType::NumberInRange => "NUMBER_IN_RANGE",
            ExpressionType::NumberWithUnit => "NUMBER_WITH_UNIT",
            ExpressionType::SimpleString => "SIMPLE_STRING",
            ExpressionType::SimpleInteger => "SIMPLE_INTEGER",
            ExpressionType::ProjectValue => "PROJECT_VALUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expression {
    CustomNumber(CustomNumberExpression),
    Boolean(BooleanExpression),
    ComplexString(ComplexStringExpression),
    ValueLinking(ValueLinkingExpression),
    NumberInRange(NumberInRangeExpression),
    NumberWithUnit(NumberWithUnitExpression),
    SimpleString(SimpleStringExpression),
    SimpleInteger(SimpleIntegerExpression),
    ProjectValue(ProjectValueExpression),
}

impl Expression {
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            Expression::CustomNumber(_) => ExpressionType::CustomNumber,
            Expression::Boolean(_) => ExpressionType::Boolean,
            Expression::ComplexString(_) => ExpressionType::ComplexString,
            Expression::ValueLinking(_) => ExpressionType::ValueLinking,
            Expression::NumberInRange(_) => ExpressionType::NumberInRange,
            Expression::NumberWithUnit(_) => ExpressionType::NumberWithUnit,
            Expression::SimpleString(_) => ExpressionType::SimpleString,
            Expression::SimpleInteger(_) => ExpressionType::SimpleInteger,
            Expression::ProjectValue(_) => ExpressionType::ProjectValue,
        }
    }

    /// The flat term list. Boolean expressions render theirs from entries.
    pub fn terms(&self) -> Cow<'_, [Term]> {
        match self {
            Expression::CustomNumber(e) => Cow::Borrowed(e.terms()),
            Expression::Boolean(e) => Cow::Owned(e.terms()),
            Expression::ComplexString(e) => Cow::Borrowed(e.terms()),
            Expression::ValueLinking(e) => Cow::Owned(e.terms()),
            Expression::NumberInRange(e) => Cow::Owned(e.terms()),
            Expression::NumberWithUnit(e) => Cow::Owned(vec![e.term()]),
            Expression::SimpleString(e) => Cow::Owned(vec![e.term()]),
            Expression::SimpleInteger(e) => Cow::Owned(vec![e.term()]),
            Expression::ProjectValue(e) => Cow::Owned(vec![e.term()]),
        }
    }

    /// Every value reference used, including those nested in records.
    pub fn values_used(&self) -> BTreeSet<ValueRef> {
        values_in(&self.terms())
    }

    pub fn check(&self) -> Result<(), ExpressionError> {
        match self {
            Expression::CustomNumber(e) => Ok(e.check()?),
            Expression::Boolean(e) => e.check(),
            Expression::ComplexString(e) => Ok(e.check()?),
            Expression::ValueLinking(e) => Ok(e.check()?),
            Expression::NumberInRange(e) => Ok(e.check()?),
            Expression::NumberWithUnit(_)
            | Expression::SimpleString(_)
            | Expression::SimpleInteger(_)
            | Expression::ProjectValue(_) => {
                let terms = self.terms();
                if terms.iter().all(Term::is_valid) {
                    Ok(())
                } else {
                    Err(GrammarError::InvalidTerm { position: 0 }.into())
                }
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

pub(crate) fn values_in(terms: &[Term]) -> BTreeSet<ValueRef> {
    let mut out = BTreeSet::new();
    for term in terms {
        match term {
            Term::Value(Some(v)) => {
                out.insert(v.clone());
            }
            Term::Record(r) => {
                for entry in &r.entries {
                    out.extend(values_in(entry.value.terms()));
                }
            }
            _ => {}
        }
    }
    out
}

macro_rules! impl_from_specialization {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(e: $ty) -> Self {
                    Expression::$variant(e)
                }
            }
        )*
    };
}

impl_from_specialization! {
    CustomNumber => CustomNumberExpression,
    Boolean => BooleanExpression,
    ComplexString => ComplexStringExpression,
    ValueLinking => ValueLinkingExpression,
    NumberInRange => NumberInRangeExpression,
    NumberWithUnit => NumberWithUnitExpression,
    SimpleString => SimpleStringExpression,
    SimpleInteger => SimpleIntegerExpression,
    ProjectValue => ProjectValueExpression,
}

/// Serialized shape shared by the specializations that validate on load.
#[derive(Serialize, Deserialize)]
pub(crate) struct TermList {
    pub(crate) terms: Vec<Term>,
}

// ──────────────────────────────────────────────
// Refresh interval
// ──────────────────────────────────────────────

/// How often a parameter bound to a live expression is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "interval", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshInterval {
    #[default]
    Once,
    UserDefined(Quantity),
    Realtime,
}

impl RefreshInterval {
    /// The user interval, or zero seconds for the other modes.
    pub fn user_defined_interval(&self) -> Quantity {
        match self {
            RefreshInterval::UserDefined(q) => *q,
            _ => Quantity::ZERO_SECOND,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshInterval::Once => "Set once",
            RefreshInterval::UserDefined(_) => "Update every",
            RefreshInterval::Realtime => "Update realtime",
        }
    }
}

/// An expression bound to a device parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub expression: Expression,
    #[serde(default)]
    pub refresh: RefreshInterval,
}

impl Binding {
    pub fn new(expression: impl Into<Expression>) -> Self {
        Binding {
            expression: expression.into(),
            refresh: RefreshInterval::Once,
        }
    }

    /// Switching away from `UserDefined` drops the stored interval.
    pub fn with_refresh(&self, refresh: RefreshInterval) -> Self {
        Binding {
            expression: self.expression.clone(),
            refresh,
        }
    }
}
