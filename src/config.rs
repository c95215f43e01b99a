//! Configuration Module
//!
//! Cache strategy selection and the configuration shape each backend accepts.
//! Every value can be loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

/// Port used when a redis configuration leaves it empty
pub const DEFAULT_REDIS_PORT: &str = "6379";

// == Bounded Cache Config ==
/// Configuration for the in-process LRU engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruConfig {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Maximum encoded size of a single value in bytes, 0 = no extra limit
    pub limit: usize,
}

impl LruConfig {
    pub fn new(capacity: usize, limit: usize) -> Self {
        Self { capacity, limit }
    }

    /// Loads the engine configuration from the environment.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `LRU_LIMIT` - Per-value byte limit, 0 disables it (default: 0)
    pub fn from_env() -> Self {
        Self {
            capacity: env_or("LRU_CAPACITY", 1000),
            limit: env_or("LRU_LIMIT", 0),
        }
    }
}

impl Default for LruConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            limit: 0,
        }
    }
}

// == Remote Store Config ==
/// Connection settings for the redis backend.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    /// Left empty to use [`DEFAULT_REDIS_PORT`]
    pub port: String,
    pub password: String,
}

impl RedisConfig {
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            password: password.into(),
        }
    }

    /// Loads connection settings from `REDIS_HOST`, `REDIS_PORT` and
    /// `REDIS_PASSWORD`. Missing variables come back empty and are rejected
    /// when the client is built.
    pub fn from_env() -> Self {
        Self {
            host: env::var("REDIS_HOST").unwrap_or_default(),
            port: env::var("REDIS_PORT").unwrap_or_default(),
            password: env::var("REDIS_PASSWORD").unwrap_or_default(),
        }
    }

    /// Port to dial, falling back to the default when unset.
    pub fn effective_port(&self) -> &str {
        if self.port.trim().is_empty() {
            DEFAULT_REDIS_PORT
        } else {
            self.port.trim()
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.effective_port())
            .field("password", &"<redacted>")
            .finish()
    }
}

// == Strategy ==
/// Backend selected when a cache is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    Redis,
    Lru,
}

impl CacheStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStrategy::Redis => "redis",
            CacheStrategy::Lru => "lru",
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheStrategy {
    type Err = CacheError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "redis" | "redis_thaila" => Ok(CacheStrategy::Redis),
            "lru" | "lru_thaila" => Ok(CacheStrategy::Lru),
            _ => Err(CacheError::InvalidStrategy(tag.to_string())),
        }
    }
}

// == Backend Config ==
/// One configuration shape per backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheConfig {
    Redis(RedisConfig),
    Lru(LruConfig),
}

impl CacheConfig {
    /// Strategy this configuration shape belongs to.
    pub fn strategy(&self) -> CacheStrategy {
        match self {
            CacheConfig::Redis(_) => CacheStrategy::Redis,
            CacheConfig::Lru(_) => CacheStrategy::Lru,
        }
    }
}

impl From<LruConfig> for CacheConfig {
    fn from(config: LruConfig) -> Self {
        CacheConfig::Lru(config)
    }
}

impl From<RedisConfig> for CacheConfig {
    fn from(config: RedisConfig) -> Self {
        CacheConfig::Redis(config)
    }
}

// == Process Config ==
/// Strategy plus the matching backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub strategy: CacheStrategy,
    pub cache: CacheConfig,
}

impl Config {
    /// Loads the full configuration from the environment.
    ///
    /// `CACHE_STRATEGY` (default: `lru`) picks which backend settings are read.
    pub fn from_env() -> Result<Self, CacheError> {
        let strategy = match env::var("CACHE_STRATEGY") {
            Ok(tag) if !tag.trim().is_empty() => tag.parse()?,
            _ => CacheStrategy::Lru,
        };

        let cache = match strategy {
            CacheStrategy::Redis => CacheConfig::Redis(RedisConfig::from_env()),
            CacheStrategy::Lru => CacheConfig::Lru(LruConfig::from_env()),
        };

        Ok(Self { strategy, cache })
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
