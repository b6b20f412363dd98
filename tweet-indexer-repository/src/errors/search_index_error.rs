//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! including both low-level backend errors and high-level application errors.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and `SearchIndexService` for all search index
/// operations. Query failures are split into [`SearchIndexError::QuerySyntax`], which the
/// caller caused, and [`SearchIndexError::Search`], which it did not.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchIndexError {
    /// Validation error (e.g., a record without an identifier).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search index backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to drop the search index.
    #[error("Index drop error: {0}")]
    IndexDropError(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to write a record.
    #[error("Write error: {0}")]
    WriteError(String),

    /// The search engine rejected the query text.
    #[error("{0}")]
    QuerySyntax(String),

    /// Any other search failure.
    #[error("{0}")]
    Search(String),

    /// Failed to parse a response from the search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index drop error.
    pub fn index_drop(msg: impl Into<String>) -> Self {
        Self::IndexDropError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create a query syntax error.
    pub fn query_syntax(msg: impl Into<String>) -> Self {
        Self::QuerySyntax(msg.into())
    }

    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Returns true if the search engine rejected the query itself.
    pub fn is_query_syntax(&self) -> bool {
        matches!(self, Self::QuerySyntax(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_display_the_engine_message() {
        let err = SearchIndexError::query_syntax("Syntax error at offset 3 near foo");
        assert_eq!(err.to_string(), "Syntax error at offset 3 near foo");
        assert!(err.is_query_syntax());
        assert!(!SearchIndexError::search("Unknown Index name").is_query_syntax());
    }
}
