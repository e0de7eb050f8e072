use std::fmt;

use crate::target::Target;

/// Error type for expression compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    /// The expression failed validation and has no target form.
    UncompilableExpression { reason: String },
    /// The term kind has no form on this target.
    UnsupportedTerm { target: Target, term: &'static str },
    /// A refresh interval that cannot be expressed in milliseconds.
    InvalidInterval { reason: String },
}

impl CodegenError {
    pub(crate) fn uncompilable(reason: impl Into<String>) -> Self {
        CodegenError::UncompilableExpression {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::UncompilableExpression { reason } => {
                write!(f, "uncompilable expression: {}", reason)
            }
            CodegenError::UnsupportedTerm { target, term } => {
                write!(f, "{} terms are not supported on {}", term, target)
            }
            CodegenError::InvalidInterval { reason } => {
                write!(f, "invalid refresh interval: {}", reason)
            }
        }
    }
}

impl std::error::Error for CodegenError {}

impl From<gizmo_core::ExpressionError> for CodegenError {
    fn from(e: gizmo_core::ExpressionError) -> Self {
        CodegenError::uncompilable(e.to_string())
    }
}

impl From<gizmo_core::ConstraintError> for CodegenError {
    fn from(e: gizmo_core::ConstraintError) -> Self {
        CodegenError::uncompilable(e.to_string())
    }
}
