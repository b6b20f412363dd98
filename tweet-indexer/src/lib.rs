//! # Tweet Indexer
//!
//! Consumes the Twitter sample stream and indexes tweets into RediSearch.
//!
//! ## Architecture
//!
//! The indexer follows the Consumer-Processor-Loader pattern:
//!
//! 1. **Consumer**: Receives tweets from the streaming source
//! 2. **Processor**: Drops sensitive tweets and normalizes the rest into flat records
//! 3. **Loader**: Writes records into the search index from a worker pool
//! 4. **Orchestrator**: Coordinates the ingest flow and paces dispatch
//!
//! ## Modules
//!
//! - [`config`]: Configuration and dependency initialization
//! - [`consumer`]: Twitter stream consumer and request signing
//! - [`processor`]: Filters and normalizes tweets
//! - [`loader`]: Writes records into the search index
//! - [`orchestrator`]: Coordinates the ingest flow
//! - [`errors`]: Error types for the indexer

pub mod config;
pub mod consumer;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;

pub use config::{Dependencies, IndexerConfig};
pub use errors::IngestError;

use thiserror::Error;
use tweet_indexer_repository::{ConfigError, SearchIndexError};

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search index error (connection or schema reset).
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] IngestError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<ConfigError> for IndexingError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
