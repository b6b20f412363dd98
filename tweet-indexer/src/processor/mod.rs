//! Processor module for the tweet indexer ingest.
//!
//! Filters posts and transforms them into index records.

mod post_processor;

pub use post_processor::{
    extract_source_label, parse_created_at, PostProcessor, CREATED_AT_FORMAT,
};
