//! LRU Ordering Module
//!
//! Arena-backed doubly linked list tracking recency for cache eviction.

use crate::cache::entry::{CacheEntry, Node, HEAD, TAIL};

/// Upper bound on slots reserved up front; larger caches grow on demand.
const MAX_PREALLOCATED_SLOTS: usize = 1024;

// == Recency List ==
/// Recency ordering of live entries.
///
/// Nodes live in a single `Vec` and link to their neighbours by index:
/// - `HEAD.next` = Most recently used
/// - `TAIL.prev` = Least recently used
///
/// Freed slots are recycled through a free list, so indices handed out by
/// [`RecencyList::push_front`] stay valid until that entry is removed.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<usize>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates an empty list with the two sentinels linked to each other.
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list, reserving room for up to `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.min(MAX_PREALLOCATED_SLOTS) + 2);
        nodes.push(Node::sentinel(HEAD, TAIL));
        nodes.push(Node::sentinel(HEAD, TAIL));
        Self {
            nodes,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a new entry at the most recently used position.
    ///
    /// Returns the arena index of the new node.
    pub fn push_front(&mut self, key: K, value: V) -> usize {
        let node = Node::new(key, value);
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_front(idx);
        self.len += 1;
        idx
    }

    // == Move To Front ==
    /// Promotes a live node to the most recently used position.
    pub fn move_to_front(&mut self, idx: usize) {
        if !self.is_live(idx) || self.nodes[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks a node and returns its entry, recycling the slot.
    pub fn remove(&mut self, idx: usize) -> Option<CacheEntry<K, V>> {
        if !self.is_live(idx) {
            return None;
        }
        self.unlink(idx);
        let entry = self.nodes[idx].entry.take();
        self.free.push(idx);
        self.len -= 1;
        entry
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }
        self.remove(idx)
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    #[allow(dead_code)]
    pub fn back(&self) -> Option<&CacheEntry<K, V>> {
        self.nodes[self.nodes[TAIL].prev].entry.as_ref()
    }

    pub fn get(&self, idx: usize) -> Option<&CacheEntry<K, V>> {
        self.nodes.get(idx).and_then(|node| node.entry.as_ref())
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<K, V>> {
        self.nodes.get_mut(idx).and_then(|node| node.entry.as_mut())
    }

    // == Clear ==
    /// Drops every entry and relinks the sentinels to each other.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[HEAD].prev = HEAD;
        self.nodes[TAIL].prev = HEAD;
        self.nodes[TAIL].next = TAIL;
        self.free.clear();
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of live entries, sentinels excluded.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.nodes[HEAD].next,
        }
    }

    fn is_live(&self, idx: usize) -> bool {
        idx != HEAD
            && idx != TAIL
            && self.nodes.get(idx).map_or(false, Node::is_occupied)
    }

    // Rewrites the two neighbours around `idx`.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }
}

/// Iterator over a [`RecencyList`], most recent first.
pub struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a CacheEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        node.entry.as_ref()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &RecencyList<&'static str, u32>) -> Vec<&'static str> {
        list.iter().map(|entry| entry.key).collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<&str, u32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.back().is_none());
        assert_eq!(list.iter().count(), 0);
    }

    #[test]
    fn test_push_front_orders_most_recent_first() {
        let mut list = RecencyList::new();
        list.push_front("a", 1);
        list.push_front("b", 2);
        list.push_front("c", 3);

        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["c", "b", "a"]);
        assert_eq!(list.back().map(|e| e.key), Some("a"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = RecencyList::new();
        let a = list.push_front("a", 1);
        list.push_front("b", 2);
        list.push_front("c", 3);

        list.move_to_front(a);

        assert_eq!(keys(&list), vec!["a", "c", "b"]);
        assert_eq!(list.back().map(|e| e.key), Some("b"));
    }

    #[test]
    fn test_move_head_is_noop() {
        let mut list = RecencyList::new();
        list.push_front("a", 1);
        let b = list.push_front("b", 2);

        list.move_to_front(b);

        assert_eq!(keys(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back_evicts_oldest() {
        let mut list = RecencyList::new();
        list.push_front("a", 1);
        list.push_front("b", 2);
        list.push_front("c", 3);

        assert_eq!(list.pop_back().map(|e| e.key), Some("a"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_back().map(|e| e.key), Some("b"));
        assert_eq!(list.pop_back().map(|e| e.key), Some("c"));
        assert!(list.pop_back().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();
        list.push_front("a", 1);
        let b = list.push_front("b", 2);
        list.push_front("c", 3);

        let removed = list.remove(b).unwrap();
        assert_eq!(removed.key, "b");
        assert_eq!(removed.value, 2);
        assert_eq!(keys(&list), vec!["c", "a"]);
    }

    #[test]
    fn test_remove_sentinel_or_freed_slot_is_rejected() {
        let mut list = RecencyList::new();
        let a = list.push_front("a", 1);

        assert!(list.remove(HEAD).is_none());
        assert!(list.remove(TAIL).is_none());
        assert!(list.remove(a).is_some());
        assert!(list.remove(a).is_none());
        assert!(list.remove(99).is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = RecencyList::new();
        let a = list.push_front("a", 1);
        list.push_front("b", 2);
        list.remove(a);

        let c = list.push_front("c", 3);
        assert_eq!(c, a);
        assert_eq!(keys(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_get_mut_updates_value() {
        let mut list = RecencyList::new();
        let a = list.push_front("a", 1);

        if let Some(entry) = list.get_mut(a) {
            entry.value = 10;
        }
        assert_eq!(list.get(a).map(|e| e.value), Some(10));
    }

    #[test]
    fn test_clear_resets_sentinels() {
        let mut list = RecencyList::new();
        list.push_front("a", 1);
        list.push_front("b", 2);

        list.clear();

        assert!(list.is_empty());
        assert!(list.back().is_none());
        assert_eq!(list.iter().count(), 0);

        list.push_front("c", 3);
        assert_eq!(keys(&list), vec!["c"]);
        assert_eq!(list.back().map(|e| e.key), Some("c"));
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = RecencyList::new();
        let a = list.push_front("a", 1);
        let b = list.push_front("b", 2);
        let c = list.push_front("c", 3);

        list.move_to_front(a);
        list.move_to_front(c);
        list.move_to_front(b);

        assert_eq!(list.pop_back().map(|e| e.key), Some("a"));
        assert_eq!(list.pop_back().map(|e| e.key), Some("c"));
        assert_eq!(list.pop_back().map(|e| e.key), Some("b"));
    }
}
