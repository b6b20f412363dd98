//! Search index service implementation.
//!
//! This module provides the main service for interacting with the search index.
//! The ingestion pipeline uses it to reset the index and write records, the search
//! API uses it to run queries.
//!
//! # Note on Schema Lifecycle
//!
//! The index is never migrated. `reset_index` drops it together with every stored
//! record and creates it again from the configured schema.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::WriteRecordRequest;
use crate::utils::record_key;
use tweet_indexer_shared::{NormalizedRecord, SearchPage, SearchRequest};

/// The main service for interacting with the search index.
///
/// This is the high-level API that application code should use. It validates input,
/// converts records into storage requests, and delegates to a `SearchIndexProvider` for
/// the backend operations.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tweet_indexer_repository::{RediSearchProvider, RedisSettings, SearchIndexService};
/// use tweet_indexer_shared::NormalizedRecord;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = RedisSettings::from_env()?;
/// let provider = Arc::new(RediSearchProvider::connect(&settings).await?);
/// let service = SearchIndexService::new(provider);
///
/// service.reset_index().await?;
///
/// let mut record = NormalizedRecord::new("1049393432123");
/// record.insert("user", "jack");
/// service.write(&record).await?;
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Arc<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService using the tweet schema.
    pub fn new(provider: Arc<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(
        provider: Arc<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    /// Drop the index with all its records, then create it from the schema.
    ///
    /// A failed drop is logged and tolerated, since the index may not exist yet.
    /// A failed create is returned: writing without an index would store records
    /// nobody can search.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchIndexError::IndexCreationError)` - If creation failed
    pub async fn reset_index(&self) -> Result<(), SearchIndexError> {
        if let Err(e) = self.provider.drop_index().await {
            warn!(error = %e, "Could not drop index, assuming it does not exist");
        }

        self.provider.create_index(&self.config.schema).await?;

        info!(prefix = %self.config.schema.key_prefix, "Index reset");
        Ok(())
    }

    /// Store a record under `<prefix><id>`, replacing any record with the same identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the record was written
    /// * `Err(SearchIndexError::ValidationError)` - If the identifier is empty
    /// * `Err(SearchIndexError)` - If the write fails
    pub async fn write(&self, record: &NormalizedRecord) -> Result<(), SearchIndexError> {
        if record.id().is_empty() {
            return Err(SearchIndexError::validation("Record id is required"));
        }

        let request = WriteRecordRequest {
            key: record_key(&self.config.schema.key_prefix, record.id()),
            fields: record.to_field_pairs(),
        };

        self.provider.write_record(&request).await
    }

    /// Run a query and return one page of results.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchIndexError> {
        self.provider.search(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IndexSchema;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;
    use tweet_indexer_shared::Document;

    /// In-memory provider keeping one hash per key. Writes merge fields like `HSET`.
    #[derive(Default)]
    struct MockProvider {
        records: Mutex<HashMap<String, Document>>,
        calls: Mutex<Vec<&'static str>>,
        fail_drop: bool,
        fail_create: bool,
        fail_write: bool,
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn drop_index(&self) -> Result<(), SearchIndexError> {
            self.calls.lock().await.push("drop");
            if self.fail_drop {
                return Err(SearchIndexError::index_drop("Unknown Index name"));
            }
            self.records.lock().await.clear();
            Ok(())
        }

        async fn create_index(&self, _schema: &IndexSchema) -> Result<(), SearchIndexError> {
            self.calls.lock().await.push("create");
            if self.fail_create {
                return Err(SearchIndexError::index_creation("Index already exists"));
            }
            Ok(())
        }

        async fn write_record(&self, request: &WriteRecordRequest) -> Result<(), SearchIndexError> {
            if self.fail_write {
                return Err(SearchIndexError::write("connection reset"));
            }
            let mut records = self.records.lock().await;
            let hash = records.entry(request.key.clone()).or_default();
            for (field, value) in &request.fields {
                hash.insert(field.clone(), value.clone());
            }
            Ok(())
        }

        async fn search(&self, _request: &SearchRequest) -> Result<SearchPage, SearchIndexError> {
            let records = self.records.lock().await;
            let documents: Vec<Document> = records.values().cloned().collect();
            Ok(SearchPage::new(documents.len() as u64, documents))
        }
    }

    #[tokio::test]
    async fn test_reset_drops_then_creates() {
        let provider = Arc::new(MockProvider::default());
        let service = SearchIndexService::new(provider.clone());

        service.reset_index().await.unwrap();

        assert_eq!(*provider.calls.lock().await, vec!["drop", "create"]);
    }

    #[tokio::test]
    async fn test_reset_tolerates_drop_failure() {
        let provider = Arc::new(MockProvider {
            fail_drop: true,
            ..Default::default()
        });
        let service = SearchIndexService::new(provider.clone());

        assert!(service.reset_index().await.is_ok());
        assert_eq!(*provider.calls.lock().await, vec!["drop", "create"]);
    }

    #[tokio::test]
    async fn test_reset_fails_when_create_fails() {
        let provider = Arc::new(MockProvider {
            fail_create: true,
            ..Default::default()
        });
        let service = SearchIndexService::new(provider);

        let result = service.reset_index().await;
        assert!(matches!(
            result,
            Err(SearchIndexError::IndexCreationError(_))
        ));
    }

    #[tokio::test]
    async fn test_write_uses_prefixed_key() {
        let provider = Arc::new(MockProvider::default());
        let service = SearchIndexService::new(provider.clone());

        let mut record = NormalizedRecord::new("42");
        record.insert("user", "jack");
        service.write(&record).await.unwrap();

        let records = provider.records.lock().await;
        let fields = records.get("tweet:42").unwrap();
        assert_eq!(fields.get("id").map(String::as_str), Some("42"));
        assert_eq!(fields.get("user").map(String::as_str), Some("jack"));
    }

    #[tokio::test]
    async fn test_rewrite_same_id_keeps_one_record() {
        let provider = Arc::new(MockProvider::default());
        let service = SearchIndexService::new(provider.clone());

        let mut first = NormalizedRecord::new("7");
        first.insert("text", "first");
        let mut second = NormalizedRecord::new("7");
        second.insert("text", "second");

        service.write(&first).await.unwrap();
        service.write(&second).await.unwrap();

        let page = service.search(&SearchRequest::new("*")).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(
            page.documents[0].get("text").map(String::as_str),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_rewrite_keeps_fields_it_does_not_set() {
        let provider = Arc::new(MockProvider::default());
        let service = SearchIndexService::new(provider.clone());

        let mut first = NormalizedRecord::new("7");
        first.insert("location", "Lisbon");
        first.insert("text", "first");
        let mut second = NormalizedRecord::new("7");
        second.insert("text", "second");

        service.write(&first).await.unwrap();
        service.write(&second).await.unwrap();

        let records = provider.records.lock().await;
        let fields = &records["tweet:7"];
        assert_eq!(fields.get("text").map(String::as_str), Some("second"));
        assert_eq!(fields.get("location").map(String::as_str), Some("Lisbon"));
    }

    #[tokio::test]
    async fn test_write_rejects_empty_id() {
        let service = SearchIndexService::new(Arc::new(MockProvider::default()));

        let result = service.write(&NormalizedRecord::new("")).await;
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let provider = Arc::new(MockProvider {
            fail_write: true,
            ..Default::default()
        });
        let service = SearchIndexService::new(provider);

        let result = service.write(&NormalizedRecord::new("1")).await;
        assert!(matches!(result, Err(SearchIndexError::WriteError(_))));
    }

    #[tokio::test]
    async fn test_custom_prefix() {
        let provider = Arc::new(MockProvider::default());
        let schema = IndexSchema {
            key_prefix: "post:".to_string(),
            ..IndexSchema::tweets()
        };
        let service = SearchIndexService::with_config(
            provider.clone(),
            SearchIndexServiceConfig::with_schema(schema),
        );

        service.write(&NormalizedRecord::new("9")).await.unwrap();
        assert!(provider.records.lock().await.contains_key("post:9"));
    }
}
