//! Loader module for the tweet indexer ingest.
//!
//! Writes normalized records into the search index from a pool of background workers,
//! so the ingest loop never waits on a write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::IngestError;
use tweet_indexer_repository::SearchIndexService;
use tweet_indexer_shared::NormalizedRecord;

/// Configuration for the search loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of concurrent writers.
    pub workers: usize,
    /// Records that may wait for a free writer before new ones are dropped.
    pub queue_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_size: 64,
        }
    }
}

/// Write outcome counters shared with the workers.
#[derive(Debug, Default)]
pub struct LoaderStats {
    written: AtomicU64,
    failed: AtomicU64,
}

impl LoaderStats {
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Loader that writes records into the search engine.
///
/// The loader is responsible for:
/// - Accepting records without blocking the caller
/// - Writing them through `SearchIndexService` on a fixed set of workers
/// - Logging and dropping records whose write fails (no retry)
pub struct SearchLoader {
    sender: Option<mpsc::Sender<NormalizedRecord>>,
    workers: Vec<JoinHandle<()>>,
    stats: Arc<LoaderStats>,
}

impl SearchLoader {
    /// Create a new search loader with the default pool size.
    pub fn new(service: Arc<SearchIndexService>) -> Self {
        Self::with_config(service, LoaderConfig::default())
    }

    /// Create a new search loader with custom configuration.
    ///
    /// Must be called from within a Tokio runtime, since workers start immediately.
    pub fn with_config(service: Arc<SearchIndexService>, config: LoaderConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_size.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let stats = Arc::new(LoaderStats::default());

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                tokio::spawn(run_worker(
                    worker,
                    Arc::clone(&receiver),
                    Arc::clone(&service),
                    Arc::clone(&stats),
                ))
            })
            .collect();

        info!(
            workers = config.workers.max(1),
            queue_size = config.queue_size.max(1),
            "Search loader started"
        );

        Self {
            sender: Some(sender),
            workers,
            stats,
        }
    }

    /// Queue a record for writing and return immediately.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The record was queued
    /// * `Err(IngestError::LoaderError)` - The queue is full or the loader is stopped;
    ///   the record is dropped
    pub fn dispatch(&self, record: NormalizedRecord) -> Result<(), IngestError> {
        let Some(sender) = &self.sender else {
            return Err(IngestError::loader(format!(
                "Loader stopped, dropping record {}",
                record.id()
            )));
        };

        match sender.try_send(record) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(record)) => Err(IngestError::loader(format!(
                "Write queue full, dropping record {}",
                record.id()
            ))),
            Err(TrySendError::Closed(record)) => Err(IngestError::loader(format!(
                "Loader stopped, dropping record {}",
                record.id()
            ))),
        }
    }

    /// Write counters.
    pub fn stats(&self) -> Arc<LoaderStats> {
        Arc::clone(&self.stats)
    }

    /// Stop all workers. Queued and in-flight writes are abandoned.
    pub fn stop(&mut self) {
        self.sender = None;
        for worker in self.workers.drain(..) {
            worker.abort();
        }
        debug!("Search loader stopped");
    }
}

impl Drop for SearchLoader {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_worker(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<NormalizedRecord>>>,
    service: Arc<SearchIndexService>,
    stats: Arc<LoaderStats>,
) {
    loop {
        let record = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(record) = record else {
            break;
        };

        match service.write(&record).await {
            Ok(()) => {
                stats.written.fetch_add(1, Ordering::Relaxed);
                debug!(worker = worker, id = %record.id(), "Record written to search index");
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    worker = worker,
                    id = %record.id(),
                    error = %e,
                    "Failed to write record, dropping it"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tweet_indexer_repository::{
        IndexSchema, SearchIndexError, SearchIndexProvider, WriteRecordRequest,
    };
    use tweet_indexer_shared::{SearchPage, SearchRequest};

    /// Mock search provider for testing.
    #[derive(Default)]
    struct MockSearchProvider {
        written: std::sync::Mutex<Vec<String>>,
        fail_writes: bool,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl SearchIndexProvider for MockSearchProvider {
        async fn drop_index(&self) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn create_index(&self, _schema: &IndexSchema) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn write_record(&self, request: &WriteRecordRequest) -> Result<(), SearchIndexError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_writes {
                return Err(SearchIndexError::write("mock failure"));
            }
            self.written.lock().unwrap().push(request.key.clone());
            Ok(())
        }

        async fn search(&self, _request: &SearchRequest) -> Result<SearchPage, SearchIndexError> {
            Ok(SearchPage::empty())
        }
    }

    async fn wait_for(stats: &LoaderStats, total: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while stats.written() + stats.failed() < total {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("writes did not complete");
    }

    #[tokio::test]
    async fn test_dispatched_records_are_written() {
        let provider = Arc::new(MockSearchProvider::default());
        let service = Arc::new(SearchIndexService::new(provider.clone()));
        let loader = SearchLoader::new(service);

        loader.dispatch(NormalizedRecord::new("1")).unwrap();
        loader.dispatch(NormalizedRecord::new("2")).unwrap();

        let stats = loader.stats();
        wait_for(&stats, 2).await;

        let mut written = provider.written.lock().unwrap().clone();
        written.sort();
        assert_eq!(written, vec!["tweet:1", "tweet:2"]);
        assert_eq!(stats.written(), 2);
    }

    #[tokio::test]
    async fn test_failed_writes_are_counted_and_dropped() {
        let provider = Arc::new(MockSearchProvider {
            fail_writes: true,
            ..Default::default()
        });
        let loader = SearchLoader::new(Arc::new(SearchIndexService::new(provider.clone())));

        loader.dispatch(NormalizedRecord::new("1")).unwrap();

        let stats = loader.stats();
        wait_for(&stats, 1).await;
        assert_eq!(stats.failed(), 1);
        assert!(provider.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_queue_drops_instead_of_waiting() {
        let provider = Arc::new(MockSearchProvider {
            gate: Some(Arc::new(Notify::new())),
            ..Default::default()
        });
        let config = LoaderConfig {
            workers: 1,
            queue_size: 1,
        };
        let loader =
            SearchLoader::with_config(Arc::new(SearchIndexService::new(provider)), config);

        // The single worker takes the first record and blocks on the gate.
        loader.dispatch(NormalizedRecord::new("1")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        loader.dispatch(NormalizedRecord::new("2")).unwrap();
        let result = loader.dispatch(NormalizedRecord::new("3"));
        assert!(matches!(result, Err(IngestError::LoaderError(_))));
    }

    #[tokio::test]
    async fn test_dispatch_after_stop_fails() {
        let provider = Arc::new(MockSearchProvider::default());
        let mut loader = SearchLoader::new(Arc::new(SearchIndexService::new(provider)));

        loader.stop();

        let result = loader.dispatch(NormalizedRecord::new("1"));
        assert!(matches!(result, Err(IngestError::LoaderError(_))));
    }
}
