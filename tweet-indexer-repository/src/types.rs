//! Request types for search index operations.

/// Request to store one flat record in the search engine.
///
/// The `key` already carries the index prefix, so a write is bound to the index
/// purely by its key. Field values are rendered as strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecordRequest {
    /// Storage key, e.g. `tweet:1049393432123`.
    pub key: String,
    /// Field name/value pairs.
    pub fields: Vec<(String, String)>,
}
