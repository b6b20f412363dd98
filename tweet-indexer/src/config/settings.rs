//! Indexer settings read from the environment.

use std::time::Duration;
use tracing::warn;

use crate::consumer::OAuthCredentials;
use crate::loader::LoaderConfig;
use tweet_indexer_repository::config::require;
use tweet_indexer_repository::{ConfigError, RedisSettings};

const CONSUMER_KEY_ENV: &str = "TWITTER_CONSUMER_KEY";
const CONSUMER_SECRET_ENV: &str = "TWITTER_CONSUMER_SECRET_KEY";
const ACCESS_TOKEN_ENV: &str = "TWITTER_ACCESS_TOKEN";
const ACCESS_SECRET_ENV: &str = "TWITTER_ACCESS_SECRET_TOKEN";

const CONNECTION_MODE_ENV: &str = "REDIS_CONNECTION_MODE";
const RETRY_INTERVAL_ENV: &str = "REDIS_RETRY_INTERVAL_SECS";
const INGEST_INTERVAL_ENV: &str = "INGEST_INTERVAL_MS";
const INGEST_WORKERS_ENV: &str = "INGEST_WORKERS";
const INGEST_QUEUE_SIZE_ENV: &str = "INGEST_QUEUE_SIZE";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default spacing between dispatched records in milliseconds.
const DEFAULT_INGEST_INTERVAL_MS: u64 = 3000;

/// Connection mode for Redis at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection at a fixed interval until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "retry".to_string())
            .to_lowercase()
            .as_str()
        {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid {}, defaulting to 'retry'", CONNECTION_MODE_ENV);
                Self::Retry
            }
        }
    }
}

/// Everything the indexer reads from its environment.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub redis: RedisSettings,
    pub twitter: OAuthCredentials,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub dispatch_interval: Duration,
    pub loader: LoaderConfig,
}

impl IndexerConfig {
    /// Load the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REDIS_HOST`, `REDIS_PASSWORD`, `REDISEARCH_INDEX_NAME`, `REDIS_TLS`: see `RedisSettings`
    /// - `TWITTER_CONSUMER_KEY`, `TWITTER_CONSUMER_SECRET_KEY`,
    ///   `TWITTER_ACCESS_TOKEN`, `TWITTER_ACCESS_SECRET_TOKEN`: app credentials (required)
    /// - `REDIS_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `REDIS_RETRY_INTERVAL_SECS`: retry interval in seconds (default: 15)
    /// - `INGEST_INTERVAL_MS`: spacing between dispatched records (default: 3000)
    /// - `INGEST_WORKERS`: concurrent writers (default: 4)
    /// - `INGEST_QUEUE_SIZE`: records waiting for a writer (default: 64)
    ///
    /// # Returns
    ///
    /// * `Ok(IndexerConfig)` - All required variables are present
    /// * `Err(ConfigError)` - A required variable is missing or a value is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let redis = RedisSettings::from_lookup(&lookup)?;

        let twitter = OAuthCredentials {
            consumer_key: require(&lookup, CONSUMER_KEY_ENV)?,
            consumer_secret: require(&lookup, CONSUMER_SECRET_ENV)?,
            access_token: require(&lookup, ACCESS_TOKEN_ENV)?,
            access_secret: require(&lookup, ACCESS_SECRET_ENV)?,
        };

        let defaults = LoaderConfig::default();
        let loader = LoaderConfig {
            workers: parse_or(&lookup, INGEST_WORKERS_ENV, defaults.workers)?,
            queue_size: parse_or(&lookup, INGEST_QUEUE_SIZE_ENV, defaults.queue_size)?,
        };

        Ok(Self {
            redis,
            twitter,
            connection_mode: ConnectionMode::parse(lookup(CONNECTION_MODE_ENV)),
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                RETRY_INTERVAL_ENV,
                DEFAULT_RETRY_INTERVAL_SECS,
            )?),
            dispatch_interval: Duration::from_millis(parse_or(
                &lookup,
                INGEST_INTERVAL_ENV,
                DEFAULT_INGEST_INTERVAL_MS,
            )?),
            loader,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) if value.is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
    }
}
