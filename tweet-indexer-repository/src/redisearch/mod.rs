//! RediSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using a Redis server with the RediSearch module as the backend.

mod index_config;
mod provider;

pub use index_config::{create_index_args, drop_index_args};
pub use provider::{
    classify_search_failure, parse_search_reply, search_args, RediSearchProvider,
    QUERY_SYNTAX_ERROR_MARKER,
};
