//! Interactive device commands.
//!
//! While a board runs the interactive firmware, the host drives an action
//! by sending one line per command: the device identifier, the action
//! name and every parameter value, each double-quoted and separated by a
//! space, terminated by [`COMMAND_DELIMITER`].

use std::fmt;

use gizmo_core::{device_identifier, Expression};

use crate::error::EvalError;
use crate::evaluate::{evaluate, LiveValue};
use crate::interpreter::EvalOptions;
use crate::live::ValueLookup;

pub const COMMAND_DELIMITER: char = '\r';

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub device: String,
    pub action: String,
    pub args: Vec<LiveValue>,
}

impl Command {
    /// Evaluates every parameter against live values. The first failing
    /// parameter aborts the command.
    pub fn evaluate<L>(
        device: &str,
        action: &str,
        parameters: &[Expression],
        lookup: &L,
        options: &EvalOptions,
    ) -> Result<Self, EvalError>
    where
        L: ValueLookup + ?Sized,
    {
        let args = parameters
            .iter()
            .map(|p| evaluate(p, lookup, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Command {
            device: device.to_string(),
            action: action.to_string(),
            args,
        })
    }

    /// The wire line, delimiter included.
    pub fn to_line(&self) -> String {
        format!("{}{}", self, COMMAND_DELIMITER)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" \"{}\"", device_identifier(&self.device), self.action)?;
        for arg in &self.args {
            write!(f, " \"{}\"", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gizmo_core::{
        CustomNumberExpression, Operator, SimpleStringExpression, Term, Unit, ValueRef,
    };
    use std::collections::HashMap;

    #[test]
    fn renders_quoted_arguments() {
        let mut values = HashMap::new();
        values.insert(ValueRef::new("Knob", "Angle"), 90.0);
        let params = vec![
            Expression::from(CustomNumberExpression::new(vec![
                Term::value("Knob", "Angle"),
                Term::op(Operator::Divide),
                Term::number(2.0, Unit::Number),
            ])),
            Expression::from(SimpleStringExpression::new("fast")),
        ];
        let cmd =
            Command::evaluate("Servo 1", "Move", &params, &values, &EvalOptions::default()).unwrap();
        assert_eq!(cmd.to_line(), "\"_Servo_1\" \"Move\" \"45.0\" \"fast\"\r");
    }

    #[test]
    fn failing_parameter_aborts() {
        let params = vec![Expression::from(CustomNumberExpression::new(vec![Term::value(
            "Knob", "Angle",
        )]))];
        let values: HashMap<ValueRef, f64> = HashMap::new();
        assert!(Command::evaluate("Servo", "Move", &params, &values, &EvalOptions::default())
            .is_err());
    }
}
