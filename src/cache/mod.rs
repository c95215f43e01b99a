//! Cache Module
//!
//! The abstract cache contract and the bounded in-process LRU engine.

mod entry;
mod lru;
mod stats;
mod store;


use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub(crate) use lru::RecencyList;
pub use stats::CacheStats;
pub use store::{check_value_size, encoded_size, LruCache};

// == Public Constants ==
/// Absolute ceiling on the encoded size of a single value
pub const MAX_VALUE_SIZE: usize = 512 * 1024 * 1024; // 512 MiB

/// Values that can cross the [`Cache`] contract.
pub trait CacheValue: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

// == Cache Contract ==
/// Operations every backend provides, whichever one the factory picked.
#[async_trait]
pub trait Cache<V: CacheValue>: Send + Sync {
    /// Returns the value stored under `key`, or `NotFound`.
    async fn get(&self, key: &str) -> Result<V>;

    /// Stores `value` under `key`. Only remote backends honor `ttl`;
    /// `Duration::ZERO` means no expiry.
    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()>;

    /// Removes `key`, or returns `NotFound`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Releases backend resources.
    async fn close(&self) -> Result<()>;

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;
}
