//! Error types for the cache backends
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type shared by every cache backend and the factory.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not present in the cache
    #[error("key not found")]
    NotFound,

    /// Encoded value exceeds the absolute ceiling or the configured limit
    #[error("value size {size} exceeds limit of {limit} bytes")]
    ValueTooLarge { size: usize, limit: usize },

    /// Bounded cache configured with a capacity below one
    #[error("LRU capacity must be greater than zero")]
    InvalidCapacity,

    /// Unknown caching strategy tag
    #[error("invalid caching strategy: {0}")]
    InvalidStrategy(String),

    /// Strategy and configuration do not belong together
    #[error("invalid cache config: {0}")]
    InvalidConfig(String),

    /// Redis configuration without a host
    #[error("missing redis host")]
    MissingRedisHost,

    /// Redis configuration without a password
    #[error("missing redis password")]
    MissingRedisPassword,

    /// Value could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by the redis client
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Subscription was not confirmed by the server
    #[error("error subscribing to channel {0}")]
    Subscribe(String),

    /// Backend was used after `close`
    #[error("cache connection is closed")]
    Closed,
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
