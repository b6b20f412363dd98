//! Error types for the search API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tweet_indexer_repository::SearchIndexError;

/// Which half of `offset_limit` failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationField {
    Offset,
    Limit,
}

impl std::fmt::Display for PaginationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offset => write!(f, "offset"),
            Self::Limit => write!(f, "limit"),
        }
    }
}

/// Errors surfaced by the search endpoint.
///
/// Every variant renders as a plain-text body with the status from
/// [`ApiError::status_code`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The query string itself could not be parsed.
    #[error("invalid query params: {0}")]
    MalformedQuery(String),

    /// `offset_limit` holds a value that is not a non-negative integer.
    #[error("invalid {0}")]
    InvalidPagination(PaginationField),

    /// The search engine rejected the query text.
    #[error("{0}")]
    QuerySyntax(String),

    /// Any other search failure.
    #[error("{0}")]
    Search(String),

    /// The result page could not be encoded.
    #[error("failed to encode response: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Create a malformed query error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedQuery(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl ToString) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedQuery(_) | Self::InvalidPagination(_) | Self::QuerySyntax(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Search(_) | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SearchIndexError> for ApiError {
    fn from(err: SearchIndexError) -> Self {
        match err {
            SearchIndexError::QuerySyntax(msg) => Self::QuerySyntax(msg),
            other => Self::Search(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_bad_request() {
        for err in [
            ApiError::malformed("invalid URL escape \"%zz\""),
            ApiError::InvalidPagination(PaginationField::Offset),
            ApiError::QuerySyntax("Syntax error at offset 1".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_server_errors_map_to_internal() {
        assert_eq!(
            ApiError::Search("Unknown Index name".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::serialization("broken pipe").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_search_index_error_classification() {
        let err: ApiError = SearchIndexError::query_syntax("Syntax error at offset 4").into();
        assert_eq!(err, ApiError::QuerySyntax("Syntax error at offset 4".to_string()));

        let err: ApiError = SearchIndexError::connection("refused").into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_pagination_message_names_the_field() {
        assert_eq!(
            ApiError::InvalidPagination(PaginationField::Offset).to_string(),
            "invalid offset"
        );
        assert_eq!(
            ApiError::InvalidPagination(PaginationField::Limit).to_string(),
            "invalid limit"
        );
    }
}
