//! # Tweet Indexer Shared
//!
//! This crate defines shared data structures and types used across the tweet indexer
//! and the search API. It includes the incoming post representation, the normalized
//! record written to the index, and the search request/page types.

pub mod fields;
pub mod types;

pub use types::normalized_record::{FieldValue, NormalizedRecord};
pub use types::post_event::{Coordinates, PostEvent};
pub use types::search_page::{Document, SearchPage};
pub use types::search_request::{Paging, SearchRequest};
