//! Persisted forms.
//!
//! Terms, expressions and constraints serialize through serde with an
//! explicit discriminator (`type` or `dataType`). This module holds the
//! pieces that do not fit a plain derive: numeric bounds that may be
//! written as sentinel words, and the device-library constraint encoding,
//! whose shape depends on the declared [`DataType`].

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::PersistError;
use crate::expression::Expression;
use crate::unit::Unit;

pub const MIN_DOUBLE: &str = "MIN_DOUBLE";
pub const MAX_DOUBLE: &str = "MAX_DOUBLE";
pub const MIN_INTEGER: &str = "MIN_INTEGER";
pub const MAX_INTEGER: &str = "MAX_INTEGER";

// ──────────────────────────────────────────────
// Numeric bounds
// ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(f64),
    Word(String),
}

fn bound_word(word: &str) -> Option<f64> {
    match word {
        MIN_DOUBLE => Some(-f64::MAX),
        MAX_DOUBLE => Some(f64::MAX),
        MIN_INTEGER => Some(i32::MIN as f64),
        MAX_INTEGER => Some(i32::MAX as f64),
        _ => None,
    }
}

fn decode_bound(raw: RawBound) -> Result<f64, String> {
    match raw {
        RawBound::Number(n) => Ok(n),
        RawBound::Word(w) => {
            bound_word(&w).ok_or_else(|| format!("unknown bound '{}', expected a number or a reserved word", w))
        }
    }
}

/// Lower bound of a numeric constraint; `-f64::MAX` round-trips as `"MIN_DOUBLE"`.
pub mod lower_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if *v <= -f64::MAX {
            s.serialize_str(super::MIN_DOUBLE)
        } else {
            s.serialize_f64(*v)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let raw = super::RawBound::deserialize(d)?;
        super::decode_bound(raw).map_err(serde::de::Error::custom)
    }
}

/// Upper bound of a numeric constraint; `f64::MAX` round-trips as `"MAX_DOUBLE"`.
pub mod upper_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if *v >= f64::MAX {
            s.serialize_str(super::MAX_DOUBLE)
        } else {
            s.serialize_f64(*v)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let raw = super::RawBound::deserialize(d)?;
        super::decode_bound(raw).map_err(serde::de::Error::custom)
    }
}

// ──────────────────────────────────────────────
// Device-library constraints
// ──────────────────────────────────────────────

/// Declared data type of a device parameter or property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Double,
    Integer,
    String,
    BooleanEnum,
    IntegerEnum,
    StringIntEnum,
    Value,
    Datetime,
    DotMatrix,
}

/// Reads a constraint in device-library form.
///
/// * `[]` is unconstrained.
/// * `{"min": .., "max": .., "unit": ..}` is numeric; bounds accept the
///   reserved words.
/// * `[{"key": .., "value": ..}, ..]` is string-keyed when `data_type` is
///   `StringIntEnum`.
/// * `[1, 2, ..]` is a categorical integer set for `IntegerEnum`.
/// * `["a", "b", ..]` is a categorical string set for `BooleanEnum` and
///   `String`.
pub fn constraint_from_library(
    node: &serde_json::Value,
    data_type: DataType,
) -> Result<Constraint, PersistError> {
    if let Some(arr) = node.as_array() {
        if arr.is_empty() {
            return Ok(Constraint::None);
        }
        return match data_type {
            DataType::StringIntEnum => {
                let mut entries = Vec::with_capacity(arr.len());
                for item in arr {
                    let key = item
                        .get("key")
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| library_error("keyed entry missing 'key'"))?;
                    let value = item
                        .get("value")
                        .and_then(|v| v.as_i64())
                        .ok_or_else(|| library_error("keyed entry missing integer 'value'"))?;
                    entries.push((key.to_owned(), value));
                }
                Constraint::string_keyed(entries).map_err(|e| library_error(e.to_string()))
            }
            DataType::IntegerEnum => {
                let values = arr
                    .iter()
                    .map(|v| {
                        v.as_i64()
                            .ok_or_else(|| library_error("integer enum holds a non-integer"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Constraint::categorical_ints(values))
            }
            DataType::BooleanEnum | DataType::String => {
                let values = arr
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_owned)
                            .ok_or_else(|| library_error("string enum holds a non-string"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Constraint::categorical_strings(values))
            }
            other => Err(library_error(format!(
                "an array constraint is not valid for data type {:?}",
                other
            ))),
        };
    }

    let obj = node
        .as_object()
        .ok_or_else(|| library_error("constraint must be an array or an object"))?;
    let min = library_bound(obj.get("min"), "min")?;
    let max = library_bound(obj.get("max"), "max")?;
    let unit: Unit = obj
        .get("unit")
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| library_error("numeric constraint missing 'unit'"))?;
    Ok(Constraint::numeric(min, max, unit))
}

fn library_bound(v: Option<&serde_json::Value>, field: &str) -> Result<f64, PersistError> {
    match v {
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| library_error(format!("'{}' is not representable", field))),
        Some(serde_json::Value::String(s)) => bound_word(s).ok_or_else(|| {
            library_error(format!(
                "'{}' should be a number or a reserved word, got '{}'",
                field, s
            ))
        }),
        _ => Err(library_error(format!("numeric constraint missing '{}'", field))),
    }
}

fn library_error(message: impl Into<String>) -> PersistError {
    PersistError::Library {
        message: message.into(),
    }
}

// ──────────────────────────────────────────────
// Documents
// ──────────────────────────────────────────────

pub fn expression_from_json(value: &serde_json::Value) -> Result<Expression, PersistError> {
    Ok(Expression::deserialize(value)?)
}

pub fn expression_to_json(expression: &Expression) -> Result<serde_json::Value, PersistError> {
    Ok(serde_json::to_value(expression)?)
}

pub fn constraint_from_json(value: &serde_json::Value) -> Result<Constraint, PersistError> {
    Ok(Constraint::deserialize(value)?)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_array_is_unconstrained() {
        assert_eq!(
            constraint_from_library(&json!([]), DataType::Double).unwrap(),
            Constraint::None
        );
    }

    #[test]
    fn library_numeric_with_reserved_words() {
        let c = constraint_from_library(
            &json!({"min": "MIN_INTEGER", "max": 100, "unit": "PERCENT"}),
            DataType::Integer,
        )
        .unwrap();
        assert_eq!(c, Constraint::numeric(i32::MIN as f64, 100.0, Unit::Percent));
    }

    #[test]
    fn library_numeric_rejects_unknown_word() {
        let err = constraint_from_library(
            &json!({"min": "LOWEST", "max": 1, "unit": "NUMBER"}),
            DataType::Double,
        )
        .unwrap_err();
        assert!(err.to_string().contains("reserved word"));
    }

    #[test]
    fn library_arrays_dispatch_on_data_type() {
        let keyed = constraint_from_library(
            &json!([{"key": "LOW", "value": 0}, {"key": "HIGH", "value": 1}]),
            DataType::StringIntEnum,
        )
        .unwrap();
        assert_eq!(
            keyed,
            Constraint::string_keyed([("LOW", 0), ("HIGH", 1)]).unwrap()
        );
        let clash = constraint_from_library(
            &json!([{"key": "LOW", "value": 0}, {"key": "LOW", "value": 1}]),
            DataType::StringIntEnum,
        )
        .unwrap_err();
        assert!(clash.to_string().contains("conflicts"));

        let ints = constraint_from_library(&json!([1, 2, 3]), DataType::IntegerEnum).unwrap();
        assert_eq!(ints, Constraint::categorical_ints([1, 2, 3]));

        let strings =
            constraint_from_library(&json!(["on", "off"]), DataType::BooleanEnum).unwrap();
        assert_eq!(strings, Constraint::categorical_strings(["on", "off"]));
    }

    #[test]
    fn library_array_for_numeric_type_is_rejected() {
        assert!(constraint_from_library(&json!([1]), DataType::Double).is_err());
    }

    #[test]
    fn max_double_round_trips_as_word() {
        let c = Constraint::numeric(0.0, f64::MAX, Unit::Lux);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["max"], json!("MAX_DOUBLE"));
        assert_eq!(constraint_from_json(&v).unwrap(), c);
    }
}
