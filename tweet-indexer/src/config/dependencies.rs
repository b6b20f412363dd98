//! Dependency initialization and wiring for the tweet indexer.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{ConnectionMode, IndexerConfig};
use crate::consumer::TwitterStream;
use crate::loader::SearchLoader;
use crate::orchestrator::{Orchestrator, OrchestratorConfig};
use crate::processor::PostProcessor;
use crate::IndexingError;
use tweet_indexer_repository::{RediSearchProvider, RedisSettings, SearchIndexService};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to start.
    pub orchestrator: Orchestrator,
    /// The search index service, shared with the loader. Dropping the last reference
    /// closes the Redis connection.
    pub search_index: Arc<SearchIndexService>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// See [`IndexerConfig::from_env`] for the variables read.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies, with a freshly reset index
    /// * `Err(IndexingError)` - If configuration is missing, the connection fails in
    ///   fail-fast mode, or the index cannot be created
    pub async fn new() -> Result<Self, IndexingError> {
        let config = IndexerConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Initialize all dependencies from an already loaded configuration.
    pub async fn from_config(config: IndexerConfig) -> Result<Self, IndexingError> {
        info!(
            redis_host = %config.redis.host,
            redis_port = config.redis.port,
            index = %config.redis.index_name,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            dispatch_interval_ms = config.dispatch_interval.as_millis() as u64,
            workers = config.loader.workers,
            "Initializing dependencies"
        );

        let provider =
            Self::connect_to_redis(&config.redis, config.connection_mode, config.retry_interval)
                .await?;

        info!("Redis connection established");

        let search_index = Arc::new(SearchIndexService::new(Arc::new(provider)));

        // Exits if the index cannot be created
        search_index.reset_index().await?;

        let consumer = TwitterStream::new(config.twitter.clone())?;
        info!("Twitter stream consumer created");

        let loader = SearchLoader::with_config(Arc::clone(&search_index), config.loader.clone());

        let orchestrator = Orchestrator::with_config(
            Arc::new(consumer),
            PostProcessor::new(),
            loader,
            OrchestratorConfig {
                dispatch_interval: config.dispatch_interval,
                ..OrchestratorConfig::default()
            },
        );

        Ok(Self {
            orchestrator,
            search_index,
        })
    }

    /// Connect to Redis with retry logic based on connection mode.
    async fn connect_to_redis(
        settings: &RedisSettings,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<RediSearchProvider, IndexingError> {
        loop {
            match RediSearchProvider::connect(settings).await {
                Ok(provider) => return Ok(provider),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(IndexingError::config(format!(
                            "Failed to connect to Redis: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            redis_host = %settings.host,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to Redis, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}
