use gizmo_core::{ExpressionError, GrammarError, TermKind};

/// Failures of live evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The expression failed structural validation, or the stacks did not
    /// reduce to a single operand.
    #[error("malformed expression: {message}")]
    MalformedExpression { message: String },

    /// A value reference has no entry in the live-value cache.
    #[error("no live value for {device}.{property}")]
    UnresolvedReference { device: String, property: String },

    #[error("division by zero")]
    DivisionByZero,

    /// A term that has no numeric value appeared in arithmetic.
    #[error("{kind} term cannot be evaluated as a number")]
    NotNumeric { kind: &'static str },

    /// The expression kind has no live interpretation.
    #[error("{what} cannot be evaluated live")]
    Unsupported { what: &'static str },

    #[error("expression has {found} terms, limit is {limit}")]
    TooManyTerms { limit: usize, found: usize },
}

impl EvalError {
    pub(crate) fn not_numeric(kind: TermKind) -> Self {
        EvalError::NotNumeric { kind: kind.name() }
    }
}

impl From<GrammarError> for EvalError {
    fn from(e: GrammarError) -> Self {
        EvalError::MalformedExpression {
            message: e.to_string(),
        }
    }
}

impl From<ExpressionError> for EvalError {
    fn from(e: ExpressionError) -> Self {
        match e {
            ExpressionError::MalformedExpression(g) => g.into(),
            other => EvalError::MalformedExpression {
                message: other.to_string(),
            },
        }
    }
}

/// Failures turning a telemetry line into readings.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("empty telemetry line")]
    Empty,

    #[error("unknown device '{token}'")]
    UnknownDevice { token: String },

    #[error("device '{device}' expects {expected} fields, got {found}")]
    Arity {
        device: String,
        expected: usize,
        found: usize,
    },

    #[error("field {index} of '{device}' is not a number: '{text}'")]
    BadNumber {
        device: String,
        index: usize,
        text: String,
    },

    #[error("telemetry record longer than {limit} bytes")]
    RecordTooLong { limit: usize },

    #[error("telemetry read failed: {0}")]
    Io(#[from] std::io::Error),
}
