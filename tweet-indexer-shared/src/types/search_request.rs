//! Search request types.
//!
//! This module defines the structured request executed against the index, as
//! translated from the HTTP query string.

use serde::{Deserialize, Serialize};

/// Pagination window for a search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    /// Number of matching documents to skip.
    pub offset: usize,
    /// Maximum number of documents to return.
    pub limit: usize,
}

impl Paging {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// Search request parameters.
///
/// This struct represents a search request with all necessary parameters
/// to execute a search against the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchRequest {
    /// The query text, passed verbatim to the search engine.
    /// An empty query is valid and its meaning is left to the engine.
    pub query: String,

    /// Fields to return for each hit, in order.
    /// `None` returns the full stored record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_fields: Option<Vec<String>>,

    /// Pagination window. `None` uses the engine's default paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl SearchRequest {
    /// Create a request for the given query text with no projection and default paging.
    ///
    /// # Example
    ///
    /// ```
    /// use tweet_indexer_shared::{Paging, SearchRequest};
    ///
    /// let request = SearchRequest::new("@user:rustlang")
    ///     .with_return_fields(vec!["user".to_string(), "text".to_string()])
    ///     .with_paging(Paging::new(0, 10));
    /// assert_eq!(request.paging, Some(Paging::new(0, 10)));
    /// ```
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            return_fields: None,
            paging: None,
        }
    }

    /// Restrict the returned fields.
    pub fn with_return_fields(mut self, fields: Vec<String>) -> Self {
        self.return_fields = Some(fields);
        self
    }

    /// Set the pagination window.
    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = Some(paging);
        self
    }
}
