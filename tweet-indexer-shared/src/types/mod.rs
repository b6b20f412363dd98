//! This module defines the core data structures shared by the indexer and the search API.
//! It re-exports the commonly used types.

pub mod normalized_record;
pub mod post_event;
pub mod search_page;
pub mod search_request;

pub use normalized_record::{FieldValue, NormalizedRecord};
pub use post_event::{Coordinates, PostEvent};
pub use search_page::{Document, SearchPage};
pub use search_request::{Paging, SearchRequest};
