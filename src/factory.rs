//! Cache Factory
//!
//! One-shot dispatch from a strategy and its configuration to a boxed
//! [`Cache`]. Callers never branch on the backend afterwards.

use tracing::info;

use crate::cache::{Cache, CacheValue, LruCache};
use crate::clients::RedisCache;
use crate::config::{CacheConfig, CacheStrategy};
use crate::error::{CacheError, Result};

/// Builds the backend `strategy` names from its matching configuration.
///
/// Returns `InvalidConfig` when the configuration belongs to the other
/// strategy; construction errors of the backend itself pass through.
pub fn create_cache<V>(strategy: CacheStrategy, config: CacheConfig) -> Result<Box<dyn Cache<V>>>
where
    V: CacheValue,
{
    match (strategy, config) {
        (CacheStrategy::Redis, CacheConfig::Redis(config)) => {
            let cache = RedisCache::new(config)?;
            info!(strategy = %strategy, address = cache.address(), "cache created");
            Ok(Box::new(cache))
        }
        (CacheStrategy::Lru, CacheConfig::Lru(config)) => {
            let cache = LruCache::<String, V>::new(config)?;
            info!(
                strategy = %strategy,
                capacity = cache.capacity(),
                limit = cache.limit(),
                "cache created"
            );
            Ok(Box::new(cache))
        }
        (strategy, config) => Err(CacheError::InvalidConfig(format!(
            "{} strategy given {} config",
            strategy,
            config.strategy()
        ))),
    }
}

/// Parses a strategy tag, then builds the cache as [`create_cache`] does.
///
/// Unrecognized tags return `InvalidStrategy`.
pub fn create_cache_from_tag<V>(tag: &str, config: CacheConfig) -> Result<Box<dyn Cache<V>>>
where
    V: CacheValue,
{
    create_cache(tag.parse()?, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LruConfig, RedisConfig};
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_lru_cache() {
        let cache =
            create_cache::<String>(CacheStrategy::Lru, LruConfig::new(5, 0).into()).unwrap();

        cache
            .set("key1", "value1".to_string(), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(cache.get("key1").await.unwrap(), "value1");
        cache.delete("key1").await.unwrap();
        assert!(matches!(cache.get("key1").await, Err(CacheError::NotFound)));
        cache.clear().await.unwrap();
        cache.close().await.unwrap();
    }

    #[test]
    fn test_create_redis_cache_without_dialing() {
        let config = RedisConfig::new("localhost", "", "secret");
        assert!(create_cache::<String>(CacheStrategy::Redis, config.into()).is_ok());
    }

    #[test]
    fn test_mismatched_config_rejected() {
        let result = create_cache::<String>(CacheStrategy::Lru, RedisConfig::default().into());
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));

        let result = create_cache::<String>(CacheStrategy::Redis, LruConfig::default().into());
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let result = create_cache_from_tag::<String>("memcached", LruConfig::default().into());
        assert!(matches!(result, Err(CacheError::InvalidStrategy(tag)) if tag == "memcached"));
    }

    #[test]
    fn test_backend_errors_pass_through() {
        let result = create_cache::<String>(CacheStrategy::Lru, LruConfig::new(0, 0).into());
        assert!(matches!(result, Err(CacheError::InvalidCapacity)));

        let result = create_cache::<String>(
            CacheStrategy::Redis,
            RedisConfig::new("", "", "secret").into(),
        );
        assert!(matches!(result, Err(CacheError::MissingRedisHost)));
    }

    #[test]
    fn test_create_from_tag() {
        assert!(create_cache_from_tag::<u64>("lru", LruConfig::new(1, 0).into()).is_ok());
        assert!(create_cache_from_tag::<u64>(
            "REDIS_THAILA",
            RedisConfig::new("localhost", "", "secret").into()
        )
        .is_ok());
    }
}
