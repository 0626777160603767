//! Error types for query execution

use std::io;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors surfaced by a query store
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The store cannot be reached or is not configured
    #[error("query store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store rejected the filter expression
    #[error("malformed filter expression `{expression}`: {message}")]
    MalformedExpression {
        /// Expression as submitted
        expression: String,
        /// Store diagnostic
        message: String,
    },

    /// The store did not answer in time
    #[error("query timed out after {0} seconds")]
    Timeout(u64),

    /// The store answered with something that is not a result row
    #[error("invalid result row: {0}")]
    Protocol(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
