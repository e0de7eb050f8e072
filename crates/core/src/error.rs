use crate::unit::Unit;

/// Failures of the constraint algebra.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    /// Union or intersection of two different constraint variants.
    #[error("type mismatch: cannot combine {left} constraint with {right} constraint")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// Numeric union or intersection across different units.
    #[error("incompatible unit: {left} and {right}")]
    IncompatibleUnit { left: Unit, right: Unit },

    /// A numeric constraint was required.
    #[error("expected a numeric constraint, found {found}")]
    NotNumeric { found: &'static str },

    /// Keys and codes of a string-keyed constraint must pair one to one.
    #[error("keyed entry '{key}' = {code} conflicts with an existing entry")]
    ConflictingKey { key: String, code: i64 },
}

/// Why a term sequence is not a well-formed expression.
///
/// Positions are indices into the term list that was checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("expression is empty")]
    Empty,

    #[error("term at position {position} is incomplete")]
    InvalidTerm { position: usize },

    #[error("expression cannot start with {found}")]
    BadStart { found: &'static str },

    #[error("expression cannot end with {found}")]
    BadEnd { found: &'static str },

    #[error("{found} cannot follow {after} (position {position})")]
    UnexpectedTerm {
        position: usize,
        after: &'static str,
        found: &'static str,
    },

    #[error("closing parenthesis at position {position} has no opening match")]
    UnmatchedClose { position: usize },

    #[error("{open} parenthesis left unclosed")]
    Unclosed { open: usize },
}

/// Failures building or converting specialized expressions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("malformed expression: {0}")]
    MalformedExpression(#[from] GrammarError),

    #[error("malformed entry: {message}")]
    MalformedEntry { message: String },

    #[error("invalid linking shape: {message}")]
    InvalidLinkingShape { message: String },

    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

impl ExpressionError {
    pub(crate) fn entry(message: impl Into<String>) -> Self {
        ExpressionError::MalformedEntry {
            message: message.into(),
        }
    }

    pub(crate) fn linking(message: impl Into<String>) -> Self {
        ExpressionError::InvalidLinkingShape {
            message: message.into(),
        }
    }
}

/// Failures reading a persisted document.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid library constraint: {message}")]
    Library { message: String },
}
