//! Mini Cache - A pluggable cache with interchangeable backends
//!
//! A bounded in-process LRU engine and a redis-backed store behind one
//! async [`Cache`] contract, picked once through [`create_cache`].

pub mod cache;
pub mod clients;
pub mod config;
pub mod error;
pub mod factory;

pub use cache::{Cache, CacheValue, LruCache};
pub use clients::{PubSub, PubSubMessage, Publisher, RedisCache, Subscriber};
pub use config::{CacheConfig, CacheStrategy, Config, LruConfig, RedisConfig};
pub use error::{CacheError, Result};
pub use factory::{create_cache, create_cache_from_tag};
