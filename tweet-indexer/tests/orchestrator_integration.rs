//! Integration tests for the tweet indexer orchestrator.
//!
//! These tests use the real Orchestrator, PostProcessor and SearchLoader but mock
//! the streaming source (Consumer) and the search backend (SearchIndexProvider).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{timeout, Instant};

use tweet_indexer::consumer::{Consumer, StreamMessage};
use tweet_indexer::errors::IngestError;
use tweet_indexer::loader::{LoaderConfig, SearchLoader};
use tweet_indexer::orchestrator::{Orchestrator, OrchestratorConfig};
use tweet_indexer::processor::PostProcessor;
use tweet_indexer_repository::{
    IndexSchema, SearchIndexError, SearchIndexProvider, SearchIndexService, WriteRecordRequest,
};
use tweet_indexer_shared::{PostEvent, SearchPage, SearchRequest};

// Mock Consumer for testing
struct MockConsumer {
    messages: Vec<StreamMessage>,
    end_stream: bool,
}

impl MockConsumer {
    /// Sends the messages, then keeps the subscription open until shutdown.
    fn open(messages: Vec<StreamMessage>) -> Self {
        Self {
            messages,
            end_stream: false,
        }
    }

    /// Sends the messages, then ends the stream.
    fn closing(messages: Vec<StreamMessage>) -> Self {
        Self {
            messages,
            end_stream: true,
        }
    }
}

#[async_trait::async_trait]
impl Consumer for MockConsumer {
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        for message in self.messages.clone() {
            if sender.send(message).await.is_err() {
                return Ok(());
            }
        }

        if !self.end_stream {
            let _ = shutdown.recv().await;
        }

        let _ = sender.send(StreamMessage::End).await;
        Ok(())
    }
}

// Mock Search Provider for testing
#[derive(Default)]
struct MockSearchProvider {
    records: Mutex<HashMap<String, HashMap<String, String>>>,
    write_times: Mutex<Vec<Instant>>,
}

impl MockSearchProvider {
    fn written_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.records.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn write_count(&self) -> usize {
        self.write_times.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl SearchIndexProvider for MockSearchProvider {
    async fn drop_index(&self) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn create_index(&self, _schema: &IndexSchema) -> Result<(), SearchIndexError> {
        Ok(())
    }

    async fn write_record(&self, request: &WriteRecordRequest) -> Result<(), SearchIndexError> {
        self.write_times.lock().unwrap().push(Instant::now());
        let mut records = self.records.lock().unwrap();
        let hash = records.entry(request.key.clone()).or_default();
        for (field, value) in &request.fields {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn search(&self, _request: &SearchRequest) -> Result<SearchPage, SearchIndexError> {
        Ok(SearchPage::empty())
    }
}

fn orchestrator_with(
    consumer: MockConsumer,
    provider: Arc<MockSearchProvider>,
    dispatch_interval: Duration,
) -> Orchestrator {
    let service = Arc::new(SearchIndexService::new(provider));
    let loader = SearchLoader::with_config(service, LoaderConfig::default());
    Orchestrator::with_config(
        Arc::new(consumer),
        PostProcessor::new(),
        loader,
        OrchestratorConfig {
            dispatch_interval,
            ..OrchestratorConfig::default()
        },
    )
}

async fn wait_for_writes(provider: &MockSearchProvider, count: usize) {
    timeout(Duration::from_secs(30), async {
        while provider.write_count() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for writes");
}

fn post(id: &str) -> StreamMessage {
    StreamMessage::Post(PostEvent::new(id, "user", "text"))
}

fn sensitive_post(id: &str) -> StreamMessage {
    StreamMessage::Post(PostEvent::new(id, "user", "text").sensitive())
}

#[tokio::test]
async fn test_sensitive_posts_never_reach_the_writer() {
    let provider = Arc::new(MockSearchProvider::default());
    let consumer = MockConsumer::open(vec![
        post("1"),
        sensitive_post("2"),
        post("3"),
        sensitive_post("4"),
        post("5"),
    ]);

    let orchestrator = orchestrator_with(consumer, provider.clone(), Duration::ZERO);
    let counters = orchestrator.counters();
    let handle = orchestrator.start();

    wait_for_writes(&provider, 3).await;
    handle.stop().await.unwrap();

    assert_eq!(
        provider.written_keys(),
        vec!["tweet:1", "tweet:3", "tweet:5"]
    );
    assert_eq!(counters.received(), 5);
    assert_eq!(counters.discarded(), 2);
    assert_eq!(counters.dispatched(), 3);
}

#[tokio::test]
async fn test_written_record_has_normalized_fields() {
    let provider = Arc::new(MockSearchProvider::default());
    let event = PostEvent::new("42", "rustlang", "hello")
        .with_source(r#"<a href="https://mobile.twitter.com" rel="nofollow">Twitter Web App</a>"#)
        .with_hashtags(vec!["rust".to_string()]);
    let consumer = MockConsumer::open(vec![StreamMessage::Post(event)]);

    let handle = orchestrator_with(consumer, provider.clone(), Duration::ZERO).start();
    wait_for_writes(&provider, 1).await;
    handle.stop().await.unwrap();

    let records = provider.records.lock().unwrap();
    let fields = &records["tweet:42"];
    assert_eq!(fields["id"], "42");
    assert_eq!(fields["user"], "rustlang");
    assert_eq!(fields["source"], "Twitter Web App");
    assert_eq!(fields["hashtags"], "rust");
    assert!(!fields.contains_key("location"));
}

#[tokio::test(start_paused = true)]
async fn test_dispatches_are_rate_limited() {
    let provider = Arc::new(MockSearchProvider::default());
    let consumer = MockConsumer::open(vec![post("1"), sensitive_post("2"), post("3"), post("4")]);

    let handle = orchestrator_with(consumer, provider.clone(), Duration::from_secs(3)).start();
    wait_for_writes(&provider, 3).await;
    handle.stop().await.unwrap();

    let times = provider.write_times.lock().unwrap().clone();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        assert!(
            pair[1].duration_since(pair[0]) >= Duration::from_secs(3),
            "writes only {:?} apart",
            pair[1].duration_since(pair[0])
        );
    }
}

#[tokio::test]
async fn test_run_ends_when_stream_closes() {
    let provider = Arc::new(MockSearchProvider::default());
    let consumer = MockConsumer::closing(vec![
        sensitive_post("1"),
        StreamMessage::StallWarning {
            code: "FALLING_BEHIND".to_string(),
            message: "Your connection is falling behind".to_string(),
            percent_full: Some(60),
        },
        StreamMessage::Error("transient".to_string()),
    ]);

    let mut orchestrator = orchestrator_with(consumer, provider.clone(), Duration::ZERO);
    let counters = orchestrator.counters();

    let result = timeout(Duration::from_secs(5), orchestrator.run()).await;
    assert!(matches!(result, Ok(Ok(()))));
    assert_eq!(counters.received(), 1);
    assert_eq!(counters.discarded(), 1);
    assert_eq!(provider.write_count(), 0);
}

#[tokio::test]
async fn test_stop_while_waiting_for_admission() {
    let provider = Arc::new(MockSearchProvider::default());
    let consumer = MockConsumer::open(vec![post("1"), post("2")]);

    let handle = orchestrator_with(consumer, provider.clone(), Duration::from_secs(3600)).start();
    wait_for_writes(&provider, 1).await;

    let stopped = timeout(Duration::from_secs(5), handle.stop()).await;
    assert!(matches!(stopped, Ok(Ok(()))));
    assert_eq!(provider.written_keys(), vec!["tweet:1"]);
}

#[tokio::test]
async fn test_finished_resolves_when_stream_closes() {
    let provider = Arc::new(MockSearchProvider::default());
    let consumer = MockConsumer::closing(vec![]);

    let mut handle = orchestrator_with(consumer, provider, Duration::ZERO).start();
    timeout(Duration::from_secs(5), handle.finished())
        .await
        .expect("orchestrator did not finish");
    assert!(handle.stop().await.is_ok());
}
