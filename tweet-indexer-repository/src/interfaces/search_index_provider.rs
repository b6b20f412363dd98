//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations and test doubles.

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::schema::IndexSchema;
use crate::types::WriteRecordRequest;
use tweet_indexer_shared::{SearchPage, SearchRequest};

/// Abstracts the underlying search engine (RediSearch, or a mock in tests).
///
/// An implementation is bound to one named index. Implementations are injected into
/// `SearchIndexService`; application code should go through the service rather than
/// calling a provider directly.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Drop the index together with every stored record under its key prefix.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index and its records were removed
    /// * `Err(SearchIndexError)` - If the drop failed, including when the index does not exist
    async fn drop_index(&self) -> Result<(), SearchIndexError>;

    /// Create the index from the given schema.
    ///
    /// # Arguments
    ///
    /// * `schema` - Field definitions and the key prefix that binds records to the index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If creation fails
    async fn create_index(&self, schema: &IndexSchema) -> Result<(), SearchIndexError>;

    /// Set the given fields on the record stored under the key, creating it if absent.
    ///
    /// Fields of an existing record that the request does not name are left as they are.
    ///
    /// # Arguments
    ///
    /// * `request` - The storage key and the fields to write
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the record was written
    /// * `Err(SearchIndexError)` - If the write fails
    async fn write_record(&self, request: &WriteRecordRequest) -> Result<(), SearchIndexError>;

    /// Execute a query and return one page of hits plus the total hit count.
    ///
    /// # Arguments
    ///
    /// * `request` - Query text, optional field projection and optional paging
    ///
    /// # Returns
    ///
    /// * `Ok(SearchPage)` - The matched documents in engine order
    /// * `Err(SearchIndexError::QuerySyntax)` - If the engine rejected the query text
    /// * `Err(SearchIndexError)` - For any other failure
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchIndexError>;
}
