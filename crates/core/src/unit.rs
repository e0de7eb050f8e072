//! Physical units and unit-tagged quantities.
//!
//! Every [`Unit`] belongs to exactly one [`UnitKind`]. Quantities are only
//! comparable when their units match exactly; conversion between units of
//! the same kind is opt-in through [`Unit::converter_to`].

use std::fmt;

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Unit kinds
// ──────────────────────────────────────────────

/// Category a unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    Temperature,
    Distance,
    Time,
    Acceleration,
    Pressure,
    AngularVelocity,
    SoundIntensity,
    MagneticField,
    LightIntensity,
    AngularDistance,
    Frequency,
    Ratio,
    Audio,
    Unspecified,
}

// ──────────────────────────────────────────────
// Units
// ──────────────────────────────────────────────

/// A unit tag attached to a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Unit {
    Time,
    #[serde(rename = "METERPERSECSQUARE")]
    MeterPerSecSquare,
    Hectopascal,
    Meter,
    Celsius,
    Fahrenheit,
    Kelvin,
    #[serde(rename = "RADIUSPERSEC")]
    RadianPerSec,
    #[serde(rename = "DEGREEPERSEC")]
    DegreePerSec,
    Decibel,
    Microtesla,
    Centimeter,
    Lux,
    Degree,
    Second,
    Millisecond,
    Wav,
    Number,
    Percent,
    NotSpecified,
    Hertz,
    Bpm,
}

impl Unit {
    pub const ALL: [Unit; 22] = [
        Unit::Time,
        Unit::MeterPerSecSquare,
        Unit::Hectopascal,
        Unit::Meter,
        Unit::Celsius,
        Unit::Fahrenheit,
        Unit::Kelvin,
        Unit::RadianPerSec,
        Unit::DegreePerSec,
        Unit::Decibel,
        Unit::Microtesla,
        Unit::Centimeter,
        Unit::Lux,
        Unit::Degree,
        Unit::Second,
        Unit::Millisecond,
        Unit::Wav,
        Unit::Number,
        Unit::Percent,
        Unit::NotSpecified,
        Unit::Hertz,
        Unit::Bpm,
    ];

    pub fn kind(self) -> UnitKind {
        match self {
            Unit::Celsius | Unit::Fahrenheit | Unit::Kelvin => UnitKind::Temperature,
            Unit::Meter | Unit::Centimeter => UnitKind::Distance,
            Unit::Time | Unit::Second | Unit::Millisecond => UnitKind::Time,
            Unit::MeterPerSecSquare => UnitKind::Acceleration,
            Unit::Hectopascal => UnitKind::Pressure,
            Unit::RadianPerSec | Unit::DegreePerSec => UnitKind::AngularVelocity,
            Unit::Decibel => UnitKind::SoundIntensity,
            Unit::Microtesla => UnitKind::MagneticField,
            Unit::Lux => UnitKind::LightIntensity,
            Unit::Degree => UnitKind::AngularDistance,
            Unit::Hertz | Unit::Bpm => UnitKind::Frequency,
            Unit::Percent => UnitKind::Ratio,
            Unit::Wav => UnitKind::Audio,
            Unit::Number | Unit::NotSpecified => UnitKind::Unspecified,
        }
    }

    /// Short display symbol shown next to a value.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Time => "Time",
            Unit::MeterPerSecSquare => "m/s^2",
            Unit::Hectopascal => "hPa",
            Unit::Meter => "m",
            Unit::Celsius => "\u{00b0}C",
            Unit::Fahrenheit => "\u{00b0}F",
            Unit::Kelvin => "\u{00b0}K",
            Unit::RadianPerSec => "Rad/s",
            Unit::DegreePerSec => "degree/s",
            Unit::Decibel => "dB",
            Unit::Microtesla => "\u{00b5}T",
            Unit::Centimeter => "cm",
            Unit::Lux => "lux",
            Unit::Degree => "\u{00b0}",
            Unit::Second => "sec",
            Unit::Millisecond => "ms",
            Unit::Wav => "wav",
            Unit::Number => "Number",
            Unit::Percent => "%",
            Unit::NotSpecified => "not specified",
            Unit::Hertz => "Hz",
            Unit::Bpm => "BPM",
        }
    }

    /// Returns a converter from `self` to `to`, if one is known.
    ///
    /// Identical units always convert (identity). Different units convert
    /// only within the same kind and only where a conversion is defined:
    /// temperature (C/F/K), distance (m/cm) and time (s/ms).
    ///
    /// Results saturate at `±f64::MAX`, so the unbounded sentinels stay
    /// unbounded instead of overflowing to infinity.
    pub fn converter_to(self, to: Unit) -> Option<impl Fn(f64) -> f64> {
        let same = self == to;
        if !same
            && (self.kind() != to.kind()
                || to_base(self, 0.0).is_none()
                || from_base(to, 0.0).is_none())
        {
            return None;
        }
        Some(move |v: f64| {
            if same {
                return v;
            }
            if v.abs() >= f64::MAX {
                return v.clamp(-f64::MAX, f64::MAX);
            }
            // Both lookups were checked above.
            to_base(self, v)
                .and_then(|base| from_base(to, base))
                .unwrap_or(v)
                .clamp(-f64::MAX, f64::MAX)
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Converts into the base unit of the kind (Celsius, meter, second).
fn to_base(unit: Unit, v: f64) -> Option<f64> {
    match unit {
        Unit::Celsius | Unit::Meter | Unit::Second => Some(v),
        Unit::Fahrenheit => Some((v - 32.0) * 5.0 / 9.0),
        Unit::Kelvin => Some(v - 273.15),
        Unit::Centimeter => Some(v / 100.0),
        Unit::Millisecond => Some(v / 1000.0),
        _ => None,
    }
}

fn from_base(unit: Unit, v: f64) -> Option<f64> {
    match unit {
        Unit::Celsius | Unit::Meter | Unit::Second => Some(v),
        Unit::Fahrenheit => Some(v * 9.0 / 5.0 + 32.0),
        Unit::Kelvin => Some(v + 273.15),
        Unit::Centimeter => Some(v * 100.0),
        Unit::Millisecond => Some(v * 1000.0),
        _ => None,
    }
}

// ──────────────────────────────────────────────
// Quantity
// ──────────────────────────────────────────────

/// A numeric value tagged with a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub const ZERO: Quantity = Quantity {
        value: 0.0,
        unit: Unit::NotSpecified,
    };

    pub const ZERO_SECOND: Quantity = Quantity {
        value: 0.0,
        unit: Unit::Second,
    };

    pub const fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    /// Re-expresses this quantity in `unit`, if a converter exists.
    pub fn convert_to(&self, unit: Unit) -> Option<Quantity> {
        let convert = self.unit.converter_to(unit)?;
        Some(Quantity::new(convert(self.value), unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
