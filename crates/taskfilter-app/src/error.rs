//! Error types for filter catalog and manager operations.

use taskfilter_bridge::QueryError;
use thiserror::Error;

/// Errors raised while editing the filter catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Custom filters need a title to be identified by.
    #[error("filter title must not be empty")]
    EmptyTitle,
    /// Titles are unique across built-in and custom filters.
    #[error("a filter titled `{0}` already exists")]
    DuplicateTitle(String),
    /// No custom filter carries the title.
    #[error("no custom filter titled `{0}`")]
    NotFound(String),
    /// Built-in filters are fixed.
    #[error("built-in filter `{0}` cannot be edited")]
    BuiltIn(String),
}

/// Errors surfaced by [`FilterManager`](crate::FilterManager) operations.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The query bridge failed while refreshing custom filter results.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// The catalog rejected an edit.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The operation did not finish within the caller's deadline.
    #[error("filter operation timed out after {millis} ms")]
    Timeout {
        /// Deadline that elapsed.
        millis: u64,
    },
    /// The worker running the operation panicked or was cancelled.
    #[error("filter worker failed: {0}")]
    Join(String),
}

/// Result alias for manager operations.
pub type FilterResult<T> = Result<T, FilterError>;
