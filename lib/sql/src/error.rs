use thiserror::Error;

/// Errors from the SQL storage layer.
#[derive(Debug, Error)]
pub enum SQLError {
    #[error("connection: {0}")]
    Connection(String),

    #[error("query: {0}")]
    Query(String),

    #[error("execution: {0}")]
    Execution(String),
}

impl SQLError {
    /// Whether this error is a uniqueness violation.
    ///
    /// Callers use this to distinguish "already exists" from genuine
    /// storage failures without parsing messages themselves.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            SQLError::Execution(m) | SQLError::Query(m) => m.contains("UNIQUE constraint"),
            _ => false,
        }
    }
}
