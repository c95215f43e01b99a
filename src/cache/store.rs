//! Cache Store Module
//!
//! Bounded LRU engine combining a HashMap index with the arena recency list,
//! both guarded by a single lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::{Cache, CacheStats, CacheValue, RecencyList, MAX_VALUE_SIZE};
use crate::config::LruConfig;
use crate::error::{CacheError, Result};

// == Shared State ==
/// Index and ordering; always mutated together under one write guard.
#[derive(Debug)]
struct State<K, V> {
    index: HashMap<K, usize>,
    order: RecencyList<K, V>,
    stats: CacheStats,
}

impl<K, V> State<K, V>
where
    K: Hash + Eq + Clone,
{
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            order: RecencyList::with_capacity(capacity),
            stats: CacheStats::new(),
        }
    }

    fn insert(&mut self, key: K, value: V, capacity: usize) {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(idx) {
                entry.value = value;
            }
            self.order.move_to_front(idx);
            return;
        }

        if self.index.len() >= capacity {
            if let Some(evicted) = self.order.pop_back() {
                self.index.remove(&evicted.key);
                self.stats.record_eviction();
                debug!(capacity, "LRU eviction");
            }
        }

        let idx = self.order.push_front(key.clone(), value);
        self.index.insert(key, idx);
    }
}

// == LRU Cache ==
/// Fixed-capacity least recently used cache, safe to share across threads.
///
/// Every operation that touches recency (`get` included) takes the write
/// lock; read-only introspection takes the read lock and never promotes.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    limit: usize,
    state: RwLock<State<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// Returns `InvalidCapacity` if `config.capacity` is zero.
    pub fn new(config: LruConfig) -> Result<Self> {
        if config.capacity < 1 {
            return Err(CacheError::InvalidCapacity);
        }

        Ok(Self {
            capacity: config.capacity,
            limit: config.limit,
            state: RwLock::new(State::with_capacity(config.capacity)),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Per-value byte limit, 0 when only [`MAX_VALUE_SIZE`] applies.
    pub fn limit(&self) -> usize {
        self.limit
    }

    // == Set ==
    /// Inserts or overwrites `key` and marks it most recently used.
    ///
    /// A new key arriving at capacity evicts the least recently used entry
    /// first; overwriting an existing key never evicts. The value's encoded
    /// size is checked before the lock is taken, and a rejected value leaves
    /// the cache untouched.
    ///
    /// `ttl` has no effect here: entries leave only through eviction,
    /// `delete` or `clear`.
    pub fn set(&self, key: K, value: V, _ttl: Duration) -> Result<()>
    where
        V: Serialize,
    {
        let size = encoded_size(&value)?;
        self.check_size(size)?;

        self.state.write().insert(key, value, self.capacity);
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the value and promotes the key.
    ///
    /// A miss returns `NotFound` and leaves the ordering untouched.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut state = self.state.write();
        let state = &mut *state;

        match state.index.get(key).copied() {
            Some(idx) => {
                state.order.move_to_front(idx);
                state.stats.record_hit();
                state
                    .order
                    .get(idx)
                    .map(|entry| entry.value.clone())
                    .ok_or(CacheError::NotFound)
            }
            None => {
                state.stats.record_miss();
                trace!("LRU miss");
                Err(CacheError::NotFound)
            }
        }
    }

    // == Peek ==
    /// Returns a clone of the value without promoting it or touching stats.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let state = self.state.read();
        let idx = *state.index.get(key)?;
        state.order.get(idx).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes `key` from the index and the ordering.
    pub fn delete<Q>(&self, key: &Q) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut state = self.state.write();
        let idx = state.index.remove(key).ok_or(CacheError::NotFound)?;
        state.order.remove(idx);
        Ok(())
    }

    // == Clear ==
    /// Drops every entry and resets the statistics.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let dropped = state.index.len();
        let hit_rate = state.stats.hit_rate();
        state.index.clear();
        state.order.clear();
        state.stats = CacheStats::new();
        debug!(dropped, hit_rate, "LRU cleared");
    }

    /// Nothing to release for an in-process cache.
    pub fn close(&self) -> Result<()> {
        Ok(())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.read().index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<K> {
        self.state
            .read()
            .order
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        CacheStats {
            entries: state.index.len(),
            ..state.stats
        }
    }

    fn check_size(&self, size: usize) -> Result<()> {
        check_value_size(size, self.limit)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let state = self.state.read();
        assert_eq!(state.index.len(), state.order.len());
        assert!(state.order.len() <= self.capacity);
        for entry in state.order.iter() {
            let idx = state.index[&entry.key];
            assert!(state.order.get(idx).map_or(false, |e| e.key == entry.key));
        }
    }
}

#[async_trait]
impl<V> Cache<V> for LruCache<String, V>
where
    V: CacheValue,
{
    async fn get(&self, key: &str) -> Result<V> {
        LruCache::get(self, key)
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        LruCache::set(self, key.to_string(), value, ttl)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        LruCache::delete(self, key)
    }

    async fn close(&self) -> Result<()> {
        LruCache::close(self)
    }

    async fn clear(&self) -> Result<()> {
        LruCache::clear(self);
        Ok(())
    }
}

// == Size Check ==
/// Rejects encoded sizes above [`MAX_VALUE_SIZE`], or above `limit` when it
/// is non-zero.
pub fn check_value_size(size: usize, limit: usize) -> Result<()> {
    if size > MAX_VALUE_SIZE {
        return Err(CacheError::ValueTooLarge {
            size,
            limit: MAX_VALUE_SIZE,
        });
    }
    if limit > 0 && size > limit {
        return Err(CacheError::ValueTooLarge { size, limit });
    }
    Ok(())
}

/// Number of bytes `value` occupies once JSON-encoded.
///
/// Counts bytes as they are written instead of buffering the encoding.
pub fn encoded_size<V: Serialize + ?Sized>(value: &V) -> Result<usize> {
    let mut counter = ByteCounter(0);
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.0)
}

struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
