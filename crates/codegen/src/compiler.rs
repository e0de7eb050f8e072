//! Expression to target-source compilation.
//!
//! Terms compile one at a time and are joined with single spaces. Values
//! become accessor calls on the generated device variable
//! (`_Sensor.getTemperature()`). Parameter bindings additionally clamp
//! numeric results into the destination's range with the target's
//! `constrain` helper.

use gizmo_core::{
    format_decimal, Constraint, Expression, Quantity, RefreshInterval, StringPart,
    Term, TermKind, Unit, ValueLinkingExpression, ValueRef,
};
use serde::Deserialize;

use crate::error::CodegenError;
use crate::target::Target;

/// Knobs for a compilation run. Deserialized from the `[compile]` table of
/// the tool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub target: Target,
    /// Upper bound on emitted fractional digits; trailing zeros are dropped
    /// but one digit is always kept.
    pub max_fraction_digits: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            target: Target::Arduino,
            max_fraction_digits: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler { options }
    }

    pub fn for_target(target: Target) -> Self {
        Compiler {
            options: CompileOptions {
                target,
                ..CompileOptions::default()
            },
        }
    }

    pub fn target(&self) -> Target {
        self.options.target
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    fn number(&self, value: f64) -> String {
        format_decimal(value, self.options.max_fraction_digits)
    }

    fn value_ref(&self, value: &ValueRef) -> String {
        format!(
            "{}.{}",
            gizmo_core::device_identifier(&value.device),
            gizmo_core::property_accessor(&value.property)
        )
    }

    fn unsupported(&self, kind: TermKind) -> CodegenError {
        CodegenError::UnsupportedTerm {
            target: self.options.target,
            term: kind.name(),
        }
    }

    // ── Terms ───────────────────────────────────────────────────────

    pub fn compile_term(&self, term: &Term) -> Result<String, CodegenError> {
        let target = self.options.target;
        match term {
            Term::Number(q) => Ok(self.number(q.value)),
            Term::Integer(i) => Ok(i.to_string()),
            Term::String(s) => Ok(quote(s)),
            Term::Operator(op) => Ok(target.operator(*op).to_string()),
            Term::Value(Some(v)) => Ok(self.value_ref(v)),
            Term::Value(None) => Err(CodegenError::uncompilable("value slot is empty")),
            Term::DateTime(dt) => match target {
                Target::Arduino => Ok(format!(
                    "MP_DATETIME({},{},{},{},{},{})",
                    dt.second, dt.minute, dt.hour, dt.day, dt.month, dt.year
                )),
                Target::MicroPython => Ok(format!(
                    "\"{},{},{},{},{},{}\"",
                    dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
                )),
            },
            Term::Record(record) => match target {
                Target::Arduino => {
                    let entries = record
                        .entries
                        .iter()
                        .map(|e| {
                            Ok(format!(
                                "Entry({}, {})",
                                quote(&e.field),
                                self.compile_terms(e.value.terms())?
                            ))
                        })
                        .collect::<Result<Vec<_>, CodegenError>>()?;
                    Ok(format!("Record({})", entries.join(",")))
                }
                Target::MicroPython => Err(self.unsupported(TermKind::Record)),
            },
            Term::DotMatrix(m) => Ok(quote(&m.to_base16())),
        }
    }

    pub fn compile_terms(&self, terms: &[Term]) -> Result<String, CodegenError> {
        let parts = terms
            .iter()
            .map(|t| self.compile_term(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(" "))
    }

    // ── Expressions ─────────────────────────────────────────────────

    /// Compiles an expression on its own, without clamping. Invalid
    /// expressions are rejected.
    pub fn compile(&self, expression: &Expression) -> Result<String, CodegenError> {
        expression.check()?;
        let out = match expression {
            Expression::CustomNumber(e) => self.compile_terms(e.terms())?,
            Expression::Boolean(e) => self.compile_terms(&e.terms())?,
            Expression::NumberInRange(e) => self.compile_terms(&e.terms())?,
            Expression::ComplexString(e) => self.compile_string(&e.sub_expressions())?,
            Expression::ValueLinking(e) => self.compile_map(e)?,
            Expression::NumberWithUnit(e) => self.number(e.value.value),
            Expression::SimpleString(e) => quote(&e.value),
            Expression::SimpleInteger(e) => e.value.to_string(),
            Expression::ProjectValue(e) => match &e.value {
                Some(v) => self.value_ref(v),
                None => return Err(CodegenError::uncompilable("no value selected")),
            },
        };
        tracing::debug!(
            target_name = %self.options.target,
            kind = ?expression.expression_type(),
            "compiled expression"
        );
        Ok(out)
    }

    /// Compiles an expression bound to a parameter whose value-space is
    /// `destination`. Numeric results are clamped into its range.
    pub fn compile_for_parameter(
        &self,
        expression: &Expression,
        destination: &Constraint,
    ) -> Result<String, CodegenError> {
        match expression {
            Expression::CustomNumber(_) => {
                let body = self.compile(expression)?;
                self.clamp(body, destination)
            }
            Expression::ValueLinking(e) => {
                expression.check()?;
                let low = self.number(e.destination_low().value);
                let high = self.number(e.destination_high().value);
                Ok(format!(
                    "{}({}, {}, {})",
                    self.options.target.helper("constrain"),
                    self.compile_map(e)?,
                    low,
                    high
                ))
            }
            Expression::ProjectValue(e) => {
                let body = self.compile(expression)?;
                let combined = e.constraint.intersect_converted(destination)?;
                self.clamp(body, &combined)
            }
            _ => self.compile(expression),
        }
    }

    fn clamp(&self, body: String, range: &Constraint) -> Result<String, CodegenError> {
        match range {
            Constraint::Numeric { min, max, .. } => Ok(format!(
                "{}({}, {}, {})",
                self.options.target.helper("constrain"),
                body,
                self.number(*min),
                self.number(*max)
            )),
            _ => Ok(body),
        }
    }

    /// `map(source, fromLow, fromHigh, toLow, toHigh)`. An inverse linking
    /// swaps the destination bounds.
    fn compile_map(&self, linking: &ValueLinkingExpression) -> Result<String, CodegenError> {
        let source = linking
            .source()
            .ok_or_else(|| CodegenError::uncompilable("value linking has no source"))?;
        let (to_low, to_high) = if linking.is_inverse() {
            (linking.destination_high(), linking.destination_low())
        } else {
            (linking.destination_low(), linking.destination_high())
        };
        Ok(format!(
            "{}({}, {}, {}, {}, {})",
            self.options.target.helper("map"),
            self.value_ref(source),
            self.number(linking.source_low().value),
            self.number(linking.source_high().value),
            self.number(to_low.value),
            self.number(to_high.value)
        ))
    }

    fn compile_string(&self, parts: &[StringPart]) -> Result<String, CodegenError> {
        let target = self.options.target;
        match parts {
            [] => Ok(quote("")),
            [StringPart::Literal(s)] => Ok(quote(s)),
            [StringPart::Number(n)] => {
                let inner = target.number_to_text(&self.compile_terms(n.terms())?);
                Ok(match target {
                    Target::Arduino => format!("{}.c_str()", inner),
                    Target::MicroPython => inner,
                })
            }
            _ if parts.iter().all(|p| matches!(p, StringPart::Literal(_))) => {
                let joined: String = parts
                    .iter()
                    .filter_map(|p| match p {
                        StringPart::Literal(s) => Some(s.as_str()),
                        StringPart::Number(_) => None,
                    })
                    .collect();
                Ok(quote(&joined))
            }
            _ => {
                let pieces = parts
                    .iter()
                    .map(|p| match p {
                        StringPart::Literal(s) => Ok(quote(s)),
                        StringPart::Number(n) => {
                            Ok(target.number_to_text(&self.compile_terms(n.terms())?))
                        }
                    })
                    .collect::<Result<Vec<_>, CodegenError>>()?;
                Ok(match target {
                    Target::Arduino => format!("({}).c_str()", pieces.join("+")),
                    Target::MicroPython => pieces.join("+"),
                })
            }
        }
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Update period in milliseconds, or `None` for bindings that are set
    /// once or recomputed every loop.
    pub fn refresh_interval_ms(
        &self,
        refresh: &RefreshInterval,
    ) -> Result<Option<u64>, CodegenError> {
        let Quantity { value, unit } = match refresh {
            RefreshInterval::Once | RefreshInterval::Realtime => return Ok(None),
            RefreshInterval::UserDefined(q) => *q,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(CodegenError::InvalidInterval {
                reason: format!("{} is not a usable period", value),
            });
        }
        match unit {
            Unit::Second => Ok(Some((value * 1000.0) as u64)),
            Unit::Millisecond => Ok(Some(value as u64)),
            other => Err(CodegenError::InvalidInterval {
                reason: format!("unit {:?} is not a time unit", other),
            }),
        }
    }
}

/// Double-quoted string literal valid in both C++ and Python.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
