//! Firmware dialects the compiler emits.

use std::fmt;
use std::str::FromStr;

use gizmo_core::Operator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Arduino C++.
    #[default]
    Arduino,
    MicroPython,
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Arduino => "arduino",
            Target::MicroPython => "micropython",
        }
    }

    pub fn operator(self, op: Operator) -> &'static str {
        match op {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Mod => "%",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::OpenParenthesis => "(",
            Operator::CloseParenthesis => ")",
            Operator::And => match self {
                Target::Arduino => "&&",
                Target::MicroPython => "and",
            },
            Operator::Or => match self {
                Target::Arduino => "||",
                Target::MicroPython => "or",
            },
            Operator::Not => match self {
                Target::Arduino => "!",
                Target::MicroPython => "not",
            },
        }
    }

    /// Name of a runtime helper such as `constrain` or `map`. MicroPython
    /// helpers live in the `mp` module.
    pub fn helper(self, name: &str) -> String {
        match self {
            Target::Arduino => name.to_string(),
            Target::MicroPython => format!("mp.{}", name),
        }
    }

    /// Converts a numeric expression to text.
    pub fn number_to_text(self, expr: &str) -> String {
        match self {
            Target::Arduino => format!("String({})", expr),
            Target::MicroPython => format!("str({})", expr),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arduino" => Ok(Target::Arduino),
            "micropython" => Ok(Target::MicroPython),
            other => Err(format!(
                "unknown target '{}', expected 'arduino' or 'micropython'",
                other
            )),
        }
    }
}
