//! # Tweet Indexer Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search index. It includes definitions for errors, interfaces, the index
//! schema, and a concrete implementation for RediSearch.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod redisearch;
pub mod schema;
pub mod service;
pub mod types;
pub mod utils;

pub use config::{RedisSettings, SearchIndexServiceConfig};
pub use errors::{ConfigError, SearchIndexError};
pub use interfaces::SearchIndexProvider;
pub use redisearch::RediSearchProvider;
pub use schema::{FieldKind, IndexField, IndexSchema, TWEET_KEY_PREFIX};
pub use service::SearchIndexService;
pub use types::WriteRecordRequest;
pub use utils::record_key;
