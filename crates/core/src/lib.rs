//! gizmo-core: expression and constraint model for device parameters.
//!
//! Provides the value-space algebra used to describe what a device
//! parameter or sensor reading may hold, the term and expression types a
//! user builds out of literals and live values, and the structural checks
//! that gate an expression before it is compiled or interpreted.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`Unit`], [`Quantity`] -- unit-tagged numbers
//! - [`Constraint`] -- union, intersection and compatibility of value-spaces
//! - [`Term`], [`Operator`], [`ValueRef`] -- expression leaves
//! - [`Expression`] and its specializations
//! - [`grammar::check`] -- structural validation with positions
//! - [`persist`] -- persisted-form helpers and the device-library encoding

pub mod constraint;
pub mod error;
pub mod expression;
pub mod grammar;
pub mod persist;
pub mod term;
pub mod unit;

// ── Convenience re-exports ──────────────────────────────────────────

pub use constraint::{Constraint, KeyedCode, Sample};
pub use error::{ConstraintError, ExpressionError, GrammarError, PersistError};
pub use expression::{
    entries_to_terms, terms_to_entries, Binding, BooleanExpression, Comparison,
    ComplexStringExpression, CustomNumberExpression, Entry, Expression, ExpressionType,
    NumberInRangeExpression, NumberWithUnitExpression, ProjectValueExpression,
    RefreshInterval, SimpleIntegerExpression, SimpleStringExpression, StringPart,
    ValueLinkingExpression, LINKING_TERM_COUNT,
};
pub use term::{
    device_identifier, format_decimal, property_accessor, DateTime, DotMatrix, Operator,
    OperatorKind, Record, RecordEntry, Term, TermKind, ValueRef,
};
pub use unit::{Quantity, Unit, UnitKind};
