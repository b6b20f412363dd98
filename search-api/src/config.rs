//! Search API settings read from the environment.

use std::net::SocketAddr;
use tweet_indexer_repository::{ConfigError, RedisSettings};

const PORT_ENV: &str = "SEARCH_API_PORT";

/// Port the API listens on when `SEARCH_API_PORT` is unset.
pub const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub redis: RedisSettings,
    pub port: u16,
}

impl ApiConfig {
    /// Load the configuration from environment variables.
    ///
    /// Reads the Redis settings (`REDIS_HOST`, `REDIS_PASSWORD`,
    /// `REDISEARCH_INDEX_NAME`, `REDIS_TLS`) and `SEARCH_API_PORT` (default: 80).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let redis = RedisSettings::from_lookup(&lookup)?;

        let port = match lookup(PORT_ENV).filter(|v| !v.is_empty()) {
            None => DEFAULT_PORT,
            Some(value) => {
                value
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        ConfigError::invalid(PORT_ENV, e.to_string())
                    })?
            }
        };

        Ok(Self { redis, port })
    }

    /// Address to bind, on all interfaces.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
