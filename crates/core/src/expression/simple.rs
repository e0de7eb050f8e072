//! Single-term expressions used for literal parameter values.

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::term::{Term, ValueRef};
use crate::unit::Quantity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberWithUnitExpression {
    pub value: Quantity,
}

impl NumberWithUnitExpression {
    pub fn new(value: Quantity) -> Self {
        NumberWithUnitExpression { value }
    }

    pub fn term(&self) -> Term {
        Term::Number(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimpleStringExpression {
    pub value: String,
}

impl SimpleStringExpression {
    pub fn new(value: impl Into<String>) -> Self {
        SimpleStringExpression {
            value: value.into(),
        }
    }

    pub fn term(&self) -> Term {
        Term::String(self.value.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimpleIntegerExpression {
    pub value: i64,
}

impl SimpleIntegerExpression {
    pub fn new(value: i64) -> Self {
        SimpleIntegerExpression { value }
    }

    pub fn term(&self) -> Term {
        Term::Integer(self.value)
    }
}

/// A parameter fed directly from one live value.
///
/// `constraint` is the value-space of the source, kept so the value can be
/// clamped against the destination without a device library at hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectValueExpression {
    pub value: Option<ValueRef>,
    #[serde(default)]
    pub constraint: Constraint,
}

impl ProjectValueExpression {
    pub fn new(value: ValueRef, constraint: Constraint) -> Self {
        ProjectValueExpression {
            value: Some(value),
            constraint,
        }
    }

    /// The empty slot shown before the user picks a value.
    pub fn unset() -> Self {
        ProjectValueExpression::default()
    }

    pub fn term(&self) -> Term {
        Term::Value(self.value.clone())
    }
}
