//! Cache Entry Module
//!
//! Arena nodes of the recency ordering. Neighbours are arena indices, never
//! references, so the list can be relinked without shared mutable aliasing.

/// Arena slot of the head sentinel (most recently used side)
pub(crate) const HEAD: usize = 0;
/// Arena slot of the tail sentinel (least recently used side)
pub(crate) const TAIL: usize = 1;

// == Cache Entry ==
/// A live key/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
}

// == Node ==
/// A slot in the arena. Sentinels and free slots carry no entry.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) entry: Option<CacheEntry<K, V>>,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

impl<K, V> Node<K, V> {
    /// Creates an empty sentinel node linked between the given neighbours.
    pub(crate) fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            entry: None,
            prev,
            next,
        }
    }

    /// Creates a detached data node.
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            entry: Some(CacheEntry { key, value }),
            prev: HEAD,
            next: TAIL,
        }
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.entry.is_some()
    }
}
