//! Terms: the tagged leaf values an expression is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expression::CustomNumberExpression;
use crate::unit::{Quantity, Unit};

// ──────────────────────────────────────────────
// Operators
// ──────────────────────────────────────────────

/// Arity class of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Binary,
    /// Written before its operand: `not`, `(`.
    LeftUnary,
    /// Written after its operand: `)`.
    RightUnary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
    Not,
    OpenParenthesis,
    CloseParenthesis,
}

impl Operator {
    pub fn kind(self) -> OperatorKind {
        match self {
            Operator::Not | Operator::OpenParenthesis => OperatorKind::LeftUnary,
            Operator::CloseParenthesis => OperatorKind::RightUnary,
            _ => OperatorKind::Binary,
        }
    }

    /// Label shown in the editor.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "x",
            Operator::Divide => "\u{00f7}",
            Operator::Mod => "%",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => "\u{2265}",
            Operator::LessThanOrEqual => "\u{2264}",
            Operator::Equal => "=",
            Operator::NotEqual => "\u{2260}",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::OpenParenthesis => "(",
            Operator::CloseParenthesis => ")",
        }
    }

    pub fn is_binary(self) -> bool {
        self.kind() == OperatorKind::Binary
    }

    pub fn is_parenthesis(self) -> bool {
        matches!(self, Operator::OpenParenthesis | Operator::CloseParenthesis)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Plus | Operator::Minus | Operator::Multiply | Operator::Divide | Operator::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThanOrEqual
                | Operator::Equal
                | Operator::NotEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or | Operator::Not)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ──────────────────────────────────────────────
// Value references
// ──────────────────────────────────────────────

/// A live, externally supplied property of a device.
///
/// `device` is the project-level device name and doubles as the cache key;
/// `property` is the property name as declared by the device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueRef {
    pub device: String,
    pub property: String,
}

impl ValueRef {
    pub fn new(device: impl Into<String>, property: impl Into<String>) -> Self {
        ValueRef {
            device: device.into(),
            property: property.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.device.trim().is_empty() && !self.property.trim().is_empty()
    }
}

impl fmt::Display for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.device, self.property)
    }
}

/// Generated variable name of a device: `_` followed by the device name
/// with whitespace replaced by underscores.
///
/// Telemetry records are prefixed with the same name.
pub fn device_identifier(device: &str) -> String {
    let mut out = String::with_capacity(device.len() + 1);
    out.push('_');
    out.extend(device.chars().map(|c| if c.is_whitespace() { '_' } else { c }));
    out
}

/// Generated accessor for a property: `get<Name>()`, with whitespace and
/// dots replaced by underscores.
pub fn property_accessor(property: &str) -> String {
    let name: String = property
        .chars()
        .map(|c| if c.is_whitespace() || c == '.' { '_' } else { c })
        .collect();
    format!("get{}()", name)
}

// ──────────────────────────────────────────────
// Structured payloads
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub field: String,
    pub value: CustomNumberExpression,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub entries: Vec<RecordEntry>,
}

impl Record {
    pub fn is_valid(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|e| !e.field.trim().is_empty() && e.value.is_valid())
    }
}

/// A wall-clock date and time as set on a real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    pub fn is_valid(&self) -> bool {
        let Ok(month) = time::Month::try_from(self.month) else {
            return false;
        };
        time::Date::from_calendar_date(self.year, month, self.day).is_ok()
            && time::Time::from_hms(self.hour, self.minute, self.second).is_ok()
    }
}

/// A single-colour dot matrix image, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDotMatrix", into = "RawDotMatrix")]
pub struct DotMatrix {
    rows: usize,
    columns: usize,
    cells: Vec<bool>,
}

#[derive(Serialize, Deserialize)]
struct RawDotMatrix {
    rows: usize,
    columns: usize,
    data: String,
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

impl DotMatrix {
    /// A blank matrix; `None` when either dimension is zero or the cell
    /// count overflows.
    pub fn new(rows: usize, columns: usize) -> Option<Self> {
        if rows == 0 || columns == 0 {
            return None;
        }
        let cells = rows.checked_mul(columns)?;
        Some(DotMatrix {
            rows,
            columns,
            cells: vec![false; cells],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        row < self.rows && column < self.columns && self.cells[row * self.columns + column]
    }

    /// Returns a copy with one cell switched; out-of-range cells are ignored.
    pub fn with_cell(&self, row: usize, column: usize, on: bool) -> Self {
        let mut next = self.clone();
        if row < self.rows && column < self.columns {
            next.cells[row * self.columns + column] = on;
        }
        next
    }

    pub fn is_valid(&self) -> bool {
        self.rows > 0 && self.columns > 0 && self.cells.len() == self.rows * self.columns
    }

    /// Each row becomes hex digits of four cells (first cell is the high
    /// bit, the last digit zero-padded); rows are joined with `&`.
    pub fn to_base16(&self) -> String {
        let mut rows = Vec::with_capacity(self.rows);
        for r in 0..self.rows {
            let row = &self.cells[r * self.columns..(r + 1) * self.columns];
            let mut s = String::with_capacity(self.columns.div_ceil(4));
            for chunk in row.chunks(4) {
                let mut nibble = 0usize;
                for (i, on) in chunk.iter().enumerate() {
                    if *on {
                        nibble |= 1 << (3 - i);
                    }
                }
                s.push(HEX[nibble] as char);
            }
            rows.push(s);
        }
        rows.join("&")
    }

    /// Inverse of [`DotMatrix::to_base16`]. The data must hold exactly
    /// `rows` lines of `ceil(columns / 4)` digits; it is measured before
    /// any cell storage is allocated.
    pub fn from_base16(rows: usize, columns: usize, data: &str) -> Option<Self> {
        let lines: Vec<&str> = data.split('&').collect();
        let width = columns.div_ceil(4);
        if lines.len() != rows || lines.iter().any(|line| line.len() != width) {
            return None;
        }
        let mut matrix = DotMatrix::new(rows, columns)?;
        for (r, line) in lines.iter().enumerate() {
            for (d, ch) in line.chars().enumerate() {
                let nibble = ch.to_digit(16)?;
                for bit in 0..4 {
                    let c = d * 4 + bit;
                    if c < columns {
                        matrix.cells[r * columns + c] = nibble & (1 << (3 - bit)) != 0;
                    }
                }
            }
        }
        Some(matrix)
    }
}

impl TryFrom<RawDotMatrix> for DotMatrix {
    type Error = String;

    fn try_from(raw: RawDotMatrix) -> Result<Self, Self::Error> {
        DotMatrix::from_base16(raw.rows, raw.columns, &raw.data).ok_or_else(|| {
            format!(
                "dot matrix data '{}' does not match {}x{}",
                raw.data, raw.rows, raw.columns
            )
        })
    }
}

impl From<DotMatrix> for RawDotMatrix {
    fn from(m: DotMatrix) -> Self {
        RawDotMatrix {
            data: m.to_base16(),
            rows: m.rows,
            columns: m.columns,
        }
    }
}

// ──────────────────────────────────────────────
// Term
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Number,
    String,
    Integer,
    Operator,
    Value,
    Record,
    DateTime,
    DotMatrix,
}

impl TermKind {
    pub fn name(self) -> &'static str {
        match self {
            TermKind::Number => "number",
            TermKind::String => "string",
            TermKind::Integer => "integer",
            TermKind::Operator => "operator",
            TermKind::Value => "value",
            TermKind::Record => "record",
            TermKind::DateTime => "date-time",
            TermKind::DotMatrix => "dot matrix",
        }
    }
}

/// A tagged leaf value inside an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Term {
    Number(Quantity),
    String(String),
    Integer(i64),
    Operator(Operator),
    /// `None` is an empty slot the user has not filled yet.
    Value(Option<ValueRef>),
    Record(Record),
    #[serde(rename = "DATETIME")]
    DateTime(DateTime),
    DotMatrix(DotMatrix),
}

impl Term {
    pub fn number(value: f64, unit: Unit) -> Self {
        Term::Number(Quantity::new(value, unit))
    }

    pub fn op(op: Operator) -> Self {
        Term::Operator(op)
    }

    pub fn value(device: impl Into<String>, property: impl Into<String>) -> Self {
        Term::Value(Some(ValueRef::new(device, property)))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Term::String(s.into())
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Number(_) => TermKind::Number,
            Term::String(_) => TermKind::String,
            Term::Integer(_) => TermKind::Integer,
            Term::Operator(_) => TermKind::Operator,
            Term::Value(_) => TermKind::Value,
            Term::Record(_) => TermKind::Record,
            Term::DateTime(_) => TermKind::DateTime,
            Term::DotMatrix(_) => TermKind::DotMatrix,
        }
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            Term::Operator(op) => Some(*op),
            _ => None,
        }
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        self.as_operator() == Some(op)
    }

    pub fn as_quantity(&self) -> Option<Quantity> {
        match self {
            Term::Number(q) => Some(*q),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Term::Number(q) => q.value.is_finite(),
            Term::String(_) | Term::Integer(_) | Term::Operator(_) => true,
            Term::Value(v) => v.as_ref().is_some_and(ValueRef::is_valid),
            Term::Record(r) => r.is_valid(),
            Term::DateTime(dt) => dt.is_valid(),
            Term::DotMatrix(m) => m.is_valid(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Number(q) => write!(f, "{}", q),
            Term::String(s) => write!(f, "\"{}\"", s),
            Term::Integer(i) => write!(f, "{}", i),
            Term::Operator(op) => write!(f, "{}", op),
            Term::Value(Some(v)) => write!(f, "{}", v),
            Term::Value(None) => f.write_str("_"),
            Term::Record(r) => write!(f, "record({} fields)", r.entries.len()),
            Term::DateTime(dt) => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second
            ),
            Term::DotMatrix(m) => write!(f, "matrix({})", m.to_base16()),
        }
    }
}

/// Formats a number with at least one and at most `max_fraction_digits`
/// fractional digits, dropping trailing zeros: `2` -> `2.0`, `0.125` ->
/// `0.125`, `1.23456789` -> `1.234568` (for six digits).
pub fn format_decimal(value: f64, max_fraction_digits: usize) -> String {
    let digits = max_fraction_digits.max(1);
    let mut s = format!("{:.*}", digits, value);
    if let Some(dot) = s.find('.') {
        while s.len() > dot + 2 && s.ends_with('0') {
            s.pop();
        }
    }
    s
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
