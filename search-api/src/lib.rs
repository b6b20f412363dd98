//! # Search API
//!
//! HTTP front end for the tweet index. A `GET /search` query string is translated
//! into a [`tweet_indexer_shared::SearchRequest`], executed through the
//! [`tweet_indexer_repository::SearchIndexService`], and answered with the matched
//! documents plus `Search-Hits` / `Page-Size` headers.

pub mod config;
pub mod errors;
pub mod search;
pub mod server;
pub mod translator;

pub use config::ApiConfig;
pub use errors::{ApiError, PaginationField};
pub use search::SearchHandler;
pub use translator::translate;
