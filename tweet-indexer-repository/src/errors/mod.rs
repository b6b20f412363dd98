//! Error types for the tweet indexer repository.
//!
//! This module provides a unified error type for all search index operations and a
//! separate error type for loading settings from the environment.

mod config_error;
mod search_index_error;

pub use config_error::ConfigError;
pub use search_index_error::SearchIndexError;
