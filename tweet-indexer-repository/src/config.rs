//! Configuration types for the search index.
//!
//! `SearchIndexServiceConfig` tunes the service, `RedisSettings` holds the connection
//! settings both binaries read from the environment.

use url::Url;

use crate::errors::ConfigError;
use crate::schema::IndexSchema;
use crate::utils::split_host_port;

/// Host and port of the Redis server (`host[:port]`).
pub const REDIS_HOST_ENV: &str = "REDIS_HOST";
/// Password of the Redis server.
pub const REDIS_PASSWORD_ENV: &str = "REDIS_PASSWORD";
/// Name of the search index.
pub const INDEX_NAME_ENV: &str = "REDISEARCH_INDEX_NAME";
/// Set to `false` to connect without TLS.
pub const REDIS_TLS_ENV: &str = "REDIS_TLS";

/// Port used when `REDIS_HOST` carries none.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Configuration for the SearchIndexService.
#[derive(Debug, Clone, Default)]
pub struct SearchIndexServiceConfig {
    /// Schema applied on reset. Its key prefix is also used to key written records.
    pub schema: IndexSchema,
}

impl SearchIndexServiceConfig {
    /// Create a config with a custom schema.
    pub fn with_schema(schema: IndexSchema) -> Self {
        Self { schema }
    }
}

/// Connection settings for the Redis server hosting the index.
#[derive(Clone, PartialEq, Eq)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub index_name: String,
    pub tls: bool,
}

impl std::fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("index_name", &self.index_name)
            .field("tls", &self.tls)
            .finish()
    }
}

impl RedisSettings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `REDIS_HOST`: server address as `host[:port]` (required)
    /// - `REDIS_PASSWORD`: server password (required)
    /// - `REDISEARCH_INDEX_NAME`: index name (required)
    /// - `REDIS_TLS`: `false` disables TLS (default: true)
    ///
    /// # Returns
    ///
    /// * `Ok(RedisSettings)` - All required variables are present
    /// * `Err(ConfigError)` - A required variable is unset/empty or a value is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let address = require(&lookup, REDIS_HOST_ENV)?;
        let password = require(&lookup, REDIS_PASSWORD_ENV)?;
        let index_name = require(&lookup, INDEX_NAME_ENV)?;

        let (host, port) = split_host_port(&address, DEFAULT_REDIS_PORT)
            .ok_or_else(|| ConfigError::invalid(REDIS_HOST_ENV, "expected host[:port]"))?;

        let tls = match lookup(REDIS_TLS_ENV) {
            None => true,
            Some(value) => parse_bool(&value)
                .ok_or_else(|| ConfigError::invalid(REDIS_TLS_ENV, "expected true or false"))?,
        };

        Ok(Self {
            host,
            port,
            password,
            index_name,
            tls,
        })
    }

    /// Connection URL understood by the redis client, with the password percent-encoded.
    pub fn connection_url(&self) -> Result<Url, ConfigError> {
        let scheme = if self.tls { "rediss" } else { "redis" };
        let mut url = Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))
            .map_err(|e| ConfigError::invalid(REDIS_HOST_ENV, e.to_string()))?;
        url.set_password(Some(&self.password))
            .map_err(|_| ConfigError::invalid(REDIS_PASSWORD_ENV, "cannot be used in a URL"))?;
        Ok(url)
    }
}

/// Fetch a required variable, treating an empty value as unset.
pub fn require<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::missing(key)),
    }
}

/// Parse a boolean flag, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
