use std::time::Duration;

use thiserror::Error;

/// Error type for sqlfluent operations
#[derive(Debug, Error)]
pub enum SqlFluentError {
    #[error("Invalid connection binding: {0}")]
    Binding(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Statement expects {expected} parameter(s), got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column `{column}` holds {actual}, which cannot be read as `{expected}`")]
    InvalidColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("No row decoder registered for `{0}`")]
    NoRowDecoder(&'static str),

    #[error("Failed to construct `{type_name}` from row: {source}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: Box<SqlFluentError>,
    },

    #[error("Query did not complete within {0:?}")]
    Timeout(Duration),
}

/// Coarse classification of a [`SqlFluentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed connection parameters or driver registration failure.
    Binding,
    /// Connection failure, malformed SQL, parameter mismatch, backend failure.
    Execution,
    /// A row could not be turned into the requested type.
    Mapping,
    /// A bounded wait on a pending result expired.
    Timeout,
}

impl SqlFluentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlFluentError::Binding(_) => ErrorKind::Binding,
            SqlFluentError::ConnectionFailed(_)
            | SqlFluentError::QueryFailed(_)
            | SqlFluentError::ParameterCountMismatch { .. }
            | SqlFluentError::UnexpectedRowCount { .. } => ErrorKind::Execution,
            SqlFluentError::ColumnNotFound(_)
            | SqlFluentError::InvalidColumnType { .. }
            | SqlFluentError::NoRowDecoder(_)
            | SqlFluentError::Construction { .. } => ErrorKind::Mapping,
            SqlFluentError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// Result type alias for sqlfluent operations
pub type Result<T> = std::result::Result<T, SqlFluentError>;
