use quadflow_model::Variable;
use std::error::Error;
use std::io;

/// An error raised by a [QuadStorage](crate::QuadStorage) backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("{0}")]
    Other(#[source] Box<dyn Error + Send + Sync + 'static>),
}

impl StorageError {
    /// Wraps a backend specific error.
    #[inline]
    pub fn other(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self::Other(error.into())
    }
}

impl From<StorageError> for io::Error {
    #[inline]
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Other(error) => Self::other(error),
        }
    }
}

/// Signals that the caller misused an API. These errors do not depend on the data and are never
/// masked during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum UsageError {
    #[error("A filter requires at least one expression")]
    EmptyFilterExpressions,
    #[error("The default graph stack of the current scope is empty")]
    EmptyDefaultGraphStack,
    #[error("The active graph stack of the current scope is empty")]
    EmptyActiveGraphStack,
}

/// An error that occurs while evaluating an expression against a concrete solution.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExpressionError {
    #[error("The variable {0} is not bound")]
    UnboundVariable(Variable),
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Unknown function <{0}>")]
    UnknownFunction(String),
    #[error("The function {name} expects {expected} arguments but got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Aggregate {0} can only be evaluated over a group")]
    AggregateOutsideGroup(String),
    /// A failure raised by a function implementation outside of this crate family.
    #[error("The function <{name}> failed: {source}")]
    Function {
        name: String,
        #[source]
        source: Box<dyn Error + Send + Sync + 'static>,
    },
    /// The standard wrapper for failures whose origin is not an expression evaluation error.
    #[error("{message}")]
    Evaluation {
        message: String,
        #[source]
        source: Option<Box<ExpressionError>>,
    },
}

impl ExpressionError {
    /// Builds a type error from a printable message.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError(message.into())
    }

    /// Returns whether the error has been raised by a foreign function implementation.
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::Function { .. })
    }

    /// Wraps foreign errors into [ExpressionError::Evaluation]. Other errors are returned as-is.
    #[must_use]
    pub fn into_evaluation_error(self) -> Self {
        if self.is_foreign() {
            Self::Evaluation {
                message: format!("Error while evaluating expression: {self}"),
                source: Some(Box::new(self)),
            }
        } else {
            self
        }
    }
}

/// A SPARQL evaluation error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QueryEvaluationError {
    /// Error from the underlying storage.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Error while evaluating an expression outside a masking boundary.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    /// The API has been misused.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The query has been cancelled.
    #[error("The query has been cancelled")]
    Cancelled,
    /// The deadline of the query has passed.
    #[error("The query timed out")]
    Timeout,
    /// No executor has been registered for an extension node.
    #[error("No executor is registered for the algebra extension {0}")]
    UnsupportedExtension(String),
    /// An internal invariant has been violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QueryEvaluationError {
    /// Builds an internal error from a printable message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<QueryEvaluationError> for io::Error {
    #[inline]
    fn from(error: QueryEvaluationError) -> Self {
        match error {
            QueryEvaluationError::Storage(error) => error.into(),
            QueryEvaluationError::Cancelled => Self::new(io::ErrorKind::Interrupted, error),
            QueryEvaluationError::Timeout => Self::new(io::ErrorKind::TimedOut, error),
            error => Self::other(error),
        }
    }
}
