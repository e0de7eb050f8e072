//! Constraint algebra.
//!
//! A [`Constraint`] describes the legal value-space of a device parameter
//! or property. `None` is unconstrained: it accepts every value, absorbs
//! into the other operand of a union, and is the identity of intersection
//! on both sides for every variant.
//!
//! Union and intersection are only defined between operands of the same
//! variant (or with `None`); anything else is a
//! [`ConstraintError::TypeMismatch`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ConstraintError;
use crate::unit::{Quantity, Unit};

/// A label mapped to an integer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedCode {
    pub key: String,
    pub value: i64,
}

/// The legal value-space of a parameter or property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Constraint {
    None,
    Numeric {
        #[serde(with = "crate::persist::lower_bound")]
        min: f64,
        #[serde(with = "crate::persist::upper_bound")]
        max: f64,
        unit: Unit,
    },
    CategoricalString {
        values: BTreeSet<String>,
    },
    CategoricalInt {
        values: BTreeSet<i64>,
    },
    /// Insertion order is the display order.
    StringKeyedInt {
        #[serde(deserialize_with = "deserialize_keyed")]
        entries: Vec<KeyedCode>,
    },
}

/// A candidate value for [`Constraint::test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample<'a> {
    Number(Quantity),
    Text(&'a str),
    Integer(i64),
}

impl From<Quantity> for Sample<'_> {
    fn from(q: Quantity) -> Self {
        Sample::Number(q)
    }
}

impl<'a> From<&'a str> for Sample<'a> {
    fn from(s: &'a str) -> Self {
        Sample::Text(s)
    }
}

impl From<i64> for Sample<'_> {
    fn from(i: i64) -> Self {
        Sample::Integer(i)
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Constraint::None
    }
}

impl Constraint {
    // ── Construction ────────────────────────────

    pub fn numeric(min: f64, max: f64, unit: Unit) -> Self {
        Constraint::Numeric { min, max, unit }
    }

    pub fn categorical_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::CategoricalString {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn categorical_ints(values: impl IntoIterator<Item = i64>) -> Self {
        Constraint::CategoricalInt {
            values: values.into_iter().collect(),
        }
    }

    /// Builds a keyed constraint. An exact repeat of an entry is dropped;
    /// a key paired with a second code, or a code with a second key, is a
    /// [`ConstraintError::ConflictingKey`].
    pub fn string_keyed<I, S>(entries: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut out: Vec<KeyedCode> = Vec::new();
        for (key, value) in entries {
            push_keyed(
                &mut out,
                KeyedCode {
                    key: key.into(),
                    value,
                },
            )?;
        }
        Ok(Constraint::StringKeyedInt { entries: out })
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Constraint::None => "none",
            Constraint::Numeric { .. } => "numeric",
            Constraint::CategoricalString { .. } => "categorical string",
            Constraint::CategoricalInt { .. } => "categorical integer",
            Constraint::StringKeyedInt { .. } => "string-keyed integer",
        }
    }

    // ── Queries ─────────────────────────────────

    /// Whether `value` lies inside this constraint.
    pub fn test<'a>(&self, value: impl Into<Sample<'a>>) -> bool {
        match (self, value.into()) {
            (Constraint::None, _) => true,
            (Constraint::Numeric { min, max, unit }, Sample::Number(q)) => {
                q.unit == *unit && *min <= q.value && q.value <= *max
            }
            (Constraint::CategoricalString { values }, Sample::Text(s)) => values.contains(s),
            (Constraint::CategoricalInt { values }, Sample::Integer(i)) => values.contains(&i),
            (Constraint::StringKeyedInt { entries }, Sample::Text(s)) => {
                entries.iter().any(|e| e.key == s)
            }
            (Constraint::StringKeyedInt { entries }, Sample::Integer(i)) => {
                entries.iter().any(|e| e.value == i)
            }
            _ => false,
        }
    }

    /// True when no value is accepted.
    pub fn is_empty(&self) -> bool {
        match self {
            Constraint::None => false,
            Constraint::Numeric { min, max, .. } => min > max,
            Constraint::CategoricalString { values } => values.is_empty(),
            Constraint::CategoricalInt { values } => values.is_empty(),
            Constraint::StringKeyedInt { entries } => entries.is_empty(),
        }
    }

    /// True iff every value accepted by `other` is accepted by `self`.
    pub fn is_compatible(&self, other: &Constraint) -> bool {
        match (self, other) {
            (Constraint::None, _) => true,
            (_, Constraint::None) => false,
            (
                Constraint::Numeric { min, max, unit },
                Constraint::Numeric {
                    min: omin,
                    max: omax,
                    unit: ounit,
                },
            ) => unit == ounit && (omin > omax || (min <= omin && omax <= max)),
            (
                Constraint::CategoricalString { values },
                Constraint::CategoricalString { values: other },
            ) => other.is_subset(values),
            (Constraint::CategoricalInt { values }, Constraint::CategoricalInt { values: other }) => {
                other.is_subset(values)
            }
            (
                Constraint::StringKeyedInt { entries },
                Constraint::StringKeyedInt { entries: other },
            ) => other.iter().all(|o| entries.contains(o)),
            _ => false,
        }
    }

    /// Point at fraction `p` of a numeric range, `min + (max - min) * p`.
    pub fn numeric_percentile(&self, p: f64) -> Option<Quantity> {
        match self {
            Constraint::Numeric { min, max, unit } => {
                Some(Quantity::new((max - min) * p + min, *unit))
            }
            _ => None,
        }
    }

    /// The `(min, max, unit)` triple of a numeric constraint.
    pub fn numeric_bounds(&self) -> Result<(f64, f64, Unit), ConstraintError> {
        match self {
            Constraint::Numeric { min, max, unit } => Ok((*min, *max, *unit)),
            other => Err(ConstraintError::NotNumeric {
                found: other.variant_name(),
            }),
        }
    }

    // ── Algebra ─────────────────────────────────

    pub fn union(&self, other: &Constraint) -> Result<Constraint, ConstraintError> {
        match (self, other) {
            (Constraint::None, c) | (c, Constraint::None) => Ok(c.clone()),
            (
                Constraint::Numeric { min, max, unit },
                Constraint::Numeric {
                    min: omin,
                    max: omax,
                    unit: ounit,
                },
            ) => {
                same_unit(*unit, *ounit)?;
                Ok(Constraint::numeric(min.min(*omin), max.max(*omax), *unit))
            }
            (
                Constraint::CategoricalString { values },
                Constraint::CategoricalString { values: other },
            ) => Ok(Constraint::CategoricalString {
                values: values.union(other).cloned().collect(),
            }),
            (Constraint::CategoricalInt { values }, Constraint::CategoricalInt { values: other }) => {
                Ok(Constraint::CategoricalInt {
                    values: values.union(other).copied().collect(),
                })
            }
            (
                Constraint::StringKeyedInt { entries },
                Constraint::StringKeyedInt { entries: other },
            ) => {
                let mut merged = entries.clone();
                for o in other {
                    push_keyed(&mut merged, o.clone())?;
                }
                Ok(Constraint::StringKeyedInt { entries: merged })
            }
            _ => Err(mismatch(self, other)),
        }
    }

    pub fn intersect(&self, other: &Constraint) -> Result<Constraint, ConstraintError> {
        match (self, other) {
            (Constraint::None, c) | (c, Constraint::None) => Ok(c.clone()),
            (
                Constraint::Numeric { min, max, unit },
                Constraint::Numeric {
                    min: omin,
                    max: omax,
                    unit: ounit,
                },
            ) => {
                same_unit(*unit, *ounit)?;
                Ok(Constraint::numeric(min.max(*omin), max.min(*omax), *unit))
            }
            (
                Constraint::CategoricalString { values },
                Constraint::CategoricalString { values: other },
            ) => Ok(Constraint::CategoricalString {
                values: values.intersection(other).cloned().collect(),
            }),
            (Constraint::CategoricalInt { values }, Constraint::CategoricalInt { values: other }) => {
                Ok(Constraint::CategoricalInt {
                    values: values.intersection(other).copied().collect(),
                })
            }
            (
                Constraint::StringKeyedInt { entries },
                Constraint::StringKeyedInt { entries: other },
            ) => Ok(Constraint::StringKeyedInt {
                entries: entries
                    .iter()
                    .filter(|e| other.contains(e))
                    .cloned()
                    .collect(),
            }),
            _ => Err(mismatch(self, other)),
        }
    }

    /// Numeric intersection after passing both operands' bounds through
    /// `normalize`. The result keeps `self`'s unit and no unit check is
    /// made. Non-numeric operands fall back to [`Constraint::intersect`].
    pub fn intersect_with_converter(
        &self,
        other: &Constraint,
        normalize: impl Fn(f64) -> f64,
    ) -> Result<Constraint, ConstraintError> {
        match (self, other) {
            (
                Constraint::Numeric { min, max, unit },
                Constraint::Numeric {
                    min: omin,
                    max: omax,
                    ..
                },
            ) => Ok(Constraint::numeric(
                normalize(*min).max(normalize(*omin)),
                normalize(*max).min(normalize(*omax)),
                *unit,
            )),
            _ => self.intersect(other),
        }
    }

    /// Numeric intersection that first re-expresses `other` in `self`'s
    /// unit when the two units differ but are convertible.
    pub fn intersect_converted(&self, other: &Constraint) -> Result<Constraint, ConstraintError> {
        if let (
            Constraint::Numeric { unit, .. },
            Constraint::Numeric {
                min: omin,
                max: omax,
                unit: ounit,
            },
        ) = (self, other)
        {
            if unit != ounit {
                let convert =
                    ounit
                        .converter_to(*unit)
                        .ok_or(ConstraintError::IncompatibleUnit {
                            left: *unit,
                            right: *ounit,
                        })?;
                let converted = Constraint::numeric(convert(*omin), convert(*omax), *unit);
                return self.intersect(&converted);
            }
        }
        self.intersect(other)
    }
}

fn push_keyed(entries: &mut Vec<KeyedCode>, entry: KeyedCode) -> Result<(), ConstraintError> {
    match entries
        .iter()
        .find(|e| e.key == entry.key || e.value == entry.value)
    {
        Some(existing) if *existing == entry => Ok(()),
        Some(_) => Err(ConstraintError::ConflictingKey {
            key: entry.key,
            code: entry.value,
        }),
        None => {
            entries.push(entry);
            Ok(())
        }
    }
}

/// Entry list of a persisted keyed constraint, checked for one-to-one
/// pairing.
pub(crate) fn deserialize_keyed<'de, D>(d: D) -> Result<Vec<KeyedCode>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<KeyedCode>::deserialize(d)?;
    let mut out = Vec::with_capacity(raw.len());
    for entry in raw {
        push_keyed(&mut out, entry).map_err(serde::de::Error::custom)?;
    }
    Ok(out)
}

fn same_unit(left: Unit, right: Unit) -> Result<(), ConstraintError> {
    if left == right {
        Ok(())
    } else {
        Err(ConstraintError::IncompatibleUnit { left, right })
    }
}

fn mismatch(left: &Constraint, right: &Constraint) -> ConstraintError {
    tracing::debug!(
        left = left.variant_name(),
        right = right.variant_name(),
        "constraint variant mismatch"
    );
    ConstraintError::TypeMismatch {
        left: left.variant_name(),
        right: right.variant_name(),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
