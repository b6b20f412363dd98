//! Orchestrator module for the tweet indexer ingest.
//!
//! Coordinates the consumer, processor, and loader components.

mod throttle;

pub use throttle::RateGate;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

pub use crate::consumer::Consumer;
use crate::consumer::StreamMessage;
use crate::errors::IngestError;
use crate::loader::SearchLoader;
use crate::processor::PostProcessor;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
    /// Minimum spacing between two dispatched records.
    pub dispatch_interval: Duration,
    /// How often a progress line is logged.
    pub progress_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 1000,
            dispatch_interval: Duration::from_secs(3),
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Counters of what happened to received posts since startup.
#[derive(Debug, Default)]
pub struct IngestCounters {
    received: AtomicU64,
    discarded: AtomicU64,
    dispatched: AtomicU64,
    dropped: AtomicU64,
}

impl IngestCounters {
    /// Posts received from the consumer.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Posts discarded as possibly sensitive.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Records handed to the loader.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Records the loader refused.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Orchestrator that coordinates the ingest components.
///
/// The orchestrator:
/// - Manages the lifecycle of ingest components
/// - Drops sensitive posts and normalizes the rest
/// - Paces dispatch through a [`RateGate`]
/// - Handles shutdown signals
/// - Logs ingest progress
pub struct Orchestrator {
    consumer: Arc<dyn Consumer>,
    processor: PostProcessor,
    loader: SearchLoader,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    counters: Arc<IngestCounters>,
}

impl Orchestrator {
    /// Create a new orchestrator with the given components.
    pub fn new(
        consumer: Arc<dyn Consumer>,
        processor: PostProcessor,
        loader: SearchLoader,
    ) -> Self {
        Self::with_config(consumer, processor, loader, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: Arc<dyn Consumer>,
        processor: PostProcessor,
        loader: SearchLoader,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            consumer,
            processor,
            loader,
            config,
            shutdown_tx,
            counters: Arc::new(IngestCounters::default()),
        }
    }

    /// Counters updated while the orchestrator runs.
    pub fn counters(&self) -> Arc<IngestCounters> {
        Arc::clone(&self.counters)
    }

    /// Run the orchestrator in the background.
    ///
    /// The returned handle stops it; see [`OrchestratorHandle::stop`].
    pub fn start(mut self) -> OrchestratorHandle {
        let shutdown_tx = self.shutdown_tx.clone();
        let consumer_shutdown = shutdown_tx.subscribe();
        let loop_shutdown = shutdown_tx.subscribe();

        let task =
            tokio::spawn(async move { self.run_until(consumer_shutdown, loop_shutdown).await });

        OrchestratorHandle {
            shutdown_tx,
            task: Some(task),
            outcome: None,
        }
    }

    /// Run the orchestrator on the current task.
    ///
    /// Returns when the consumer's stream ends.
    pub async fn run(&mut self) -> Result<(), IngestError> {
        let consumer_shutdown = self.shutdown_tx.subscribe();
        let loop_shutdown = self.shutdown_tx.subscribe();
        self.run_until(consumer_shutdown, loop_shutdown).await
    }

    #[instrument(skip_all)]
    async fn run_until(
        &mut self,
        consumer_shutdown: broadcast::Receiver<()>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        info!("Starting tweet indexer orchestrator");

        let (event_transmitter, mut event_receiver) =
            mpsc::channel::<StreamMessage>(self.config.channel_buffer_size);

        // Start consumer in background
        let consumer = Arc::clone(&self.consumer);
        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer.run(event_transmitter, consumer_shutdown).await {
                error!(error = %e, "Consumer error");
            }
        });

        let mut gate = RateGate::new(self.config.dispatch_interval);
        let mut progress_timer = interval(self.config.progress_interval);
        progress_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Skip the first tick immediately
        progress_timer.tick().await;

        let loader_stats = self.loader.stats();

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Received shutdown signal");
                    break;
                }
                msg = event_receiver.recv() => {
                    match msg {
                        Some(StreamMessage::Post(event)) => {
                            self.counters.received.fetch_add(1, Ordering::Relaxed);

                            let Some(record) = self.processor.process(&event) else {
                                self.counters.discarded.fetch_add(1, Ordering::Relaxed);
                                continue;
                            };

                            let admitted = tokio::select! {
                                _ = gate.admit() => true,
                                _ = shutdown.recv() => false,
                            };
                            if !admitted {
                                info!("Received shutdown signal while waiting to dispatch");
                                break;
                            }

                            debug!(id = %record.id(), user = %event.user, "Dispatching post");
                            match self.loader.dispatch(record) {
                                Ok(()) => {
                                    self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
                                }
                                Err(e) => {
                                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                                    warn!(error = %e, "Record not dispatched");
                                }
                            }
                        }
                        Some(StreamMessage::StallWarning { code, message, percent_full }) => {
                            warn!(
                                code = %code,
                                percent_full = ?percent_full,
                                message = %message,
                                "Stall warning from streaming source"
                            );
                        }
                        Some(StreamMessage::Error(e)) => {
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                    }
                }
                _ = progress_timer.tick() => {
                    info!(
                        posts_received = self.counters.received(),
                        posts_discarded = self.counters.discarded(),
                        records_dispatched = self.counters.dispatched(),
                        records_dropped = self.counters.dropped(),
                        records_written = loader_stats.written(),
                        writes_failed = loader_stats.failed(),
                        "Processing progress"
                    );
                }
            }
        }

        // Stop the subscription if the loop ended on its own.
        let _ = self.shutdown_tx.send(());
        drop(event_receiver);
        let _ = consumer_handle.await;

        // In-flight writes are abandoned.
        self.loader.stop();

        info!(
            posts_received = self.counters.received(),
            posts_discarded = self.counters.discarded(),
            records_dispatched = self.counters.dispatched(),
            records_written = loader_stats.written(),
            "Orchestrator shutdown complete"
        );
        Ok(())
    }
}

/// Handle to an orchestrator running in the background.
pub struct OrchestratorHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<Result<(), IngestError>>>,
    outcome: Option<Result<(), IngestError>>,
}

impl OrchestratorHandle {
    /// Wait until the orchestrator ends on its own (stream closed by the source).
    ///
    /// Safe to cancel; `stop` may be called afterwards.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let outcome = match task.await {
                Ok(result) => result,
                Err(e) => Err(IngestError::channel(format!("Orchestrator task failed: {}", e))),
            };
            self.task = None;
            self.outcome = Some(outcome);
        }
    }

    /// Signal shutdown and wait for the ingest loop to end.
    ///
    /// Ends the subscription and stops the loader; writes still queued or in flight
    /// are abandoned.
    pub async fn stop(mut self) -> Result<(), IngestError> {
        let _ = self.shutdown_tx.send(());
        self.finished().await;
        self.outcome.unwrap_or(Ok(()))
    }
}
