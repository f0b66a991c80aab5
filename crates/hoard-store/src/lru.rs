use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use crate::traits::ByteSize;

/// Called with each entry removed to satisfy the byte budget.
pub type EvictionCallback<V> = Box<dyn FnMut(&str, &V) + Send>;

const NIL: usize = usize::MAX;

struct Node<V> {
    key: String,
    value: V,
    prev: usize,
    next: usize,
}

impl<V: ByteSize> Node<V> {
    fn size(&self) -> u64 {
        (self.key.len() + self.value.byte_size()) as u64
    }
}

/// Byte-bounded least-recently-used map.
///
/// Entries live in a slab-backed doubly linked list ordered from most to least
/// recently used; a `HashMap` indexes keys to slab slots so lookups, moves and
/// evictions are all O(1). This type is not synchronised; see
/// [`BoundedStore`](crate::BoundedStore) for the shared version.
///
/// Invariant: when `max_bytes > 0`, `used_bytes <= max_bytes` after every
/// call to [`put`](Lru::put).
pub struct Lru<V> {
    max_bytes: u64,
    used_bytes: u64,
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: usize,
    tail: usize,
    on_evicted: Option<EvictionCallback<V>>,
}

impl<V: ByteSize> Lru<V> {
    /// Create an empty store with the given byte budget (`0` = unbounded).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: NIL,
            tail: NIL,
            on_evicted: None,
        }
    }

    /// Create an empty store that reports evictions to `on_evicted`.
    pub fn with_eviction_callback(max_bytes: u64, on_evicted: EvictionCallback<V>) -> Self {
        Self {
            on_evicted: Some(on_evicted),
            ..Self::new(max_bytes)
        }
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.detach(idx);
        self.push_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Returns `true` if `key` is present. Does not touch recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or replace `key`, then evict from the cold end until the byte
    /// budget holds.
    pub fn put(&mut self, key: &str, value: V) {
        if let Some(&idx) = self.index.get(key) {
            self.detach(idx);
            self.push_front(idx);
            if let Some(node) = self.nodes[idx].as_mut() {
                let old = node.value.byte_size() as u64;
                self.used_bytes = self.used_bytes + value.byte_size() as u64 - old;
                node.value = value;
            }
        } else {
            let node = Node {
                key: key.to_string(),
                value,
                prev: NIL,
                next: NIL,
            };
            self.used_bytes += node.size();
            let idx = self.alloc(node);
            self.index.insert(key.to_string(), idx);
            self.push_front(idx);
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    /// Remove and return the least recently used entry.
    ///
    /// The eviction callback, if any, observes the entry before it is returned.
    pub fn remove_oldest(&mut self) -> Option<(String, V)> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.detach(idx);
        let node = self.release(idx)?;
        self.index.remove(&node.key);
        self.used_bytes -= node.size();
        trace!(key = %node.key, used_bytes = self.used_bytes, "evicted least recently used entry");
        if let Some(callback) = self.on_evicted.as_mut() {
            callback(&node.key, &node.value);
        }
        Some((node.key, node.value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Bytes currently accounted (sum of key and value lengths).
    pub fn bytes(&self) -> u64 {
        self.used_bytes
    }

    /// Configured byte budget; `0` means unbounded.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Keys ordered from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(node) = self.nodes.get(cursor).and_then(Option::as_ref) {
            keys.push(node.key.clone());
            cursor = node.next;
        }
        keys
    }

    fn alloc(&mut self, node: Node<V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<Node<V>> {
        let node = self.nodes[idx].take()?;
        self.free.push(idx);
        Some(node)
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = match self.nodes[idx].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        match prev {
            NIL => self.head = next,
            p => {
                if let Some(node) = self.nodes[p].as_mut() {
                    node.next = next;
                }
            }
        }
        match next {
            NIL => self.tail = prev,
            n => {
                if let Some(node) = self.nodes[n].as_mut() {
                    node.prev = prev;
                }
            }
        }
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = NIL;
            node.next = NIL;
        }
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = NIL;
            node.next = old_head;
        }
        if old_head != NIL {
            if let Some(node) = self.nodes[old_head].as_mut() {
                node.prev = idx;
            }
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }
}

impl<V> fmt::Debug for Lru<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lru")
            .field("entries", &self.index.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use hoard_types::ByteView;
    use proptest::prelude::*;

    fn view(s: &str) -> ByteView {
        ByteView::from(s)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    #[test]
    fn get_hit_and_miss() {
        let mut lru = Lru::new(0);
        lru.put("key1", view("1234"));
        assert_eq!(lru.get("key1"), Some(&view("1234")));
        assert!(lru.get("key2").is_none());
    }

    #[test]
    fn miss_has_no_side_effect() {
        let mut lru = Lru::new(0);
        lru.put("a", view("1"));
        lru.put("b", view("2"));
        assert!(lru.get("zzz").is_none());
        assert_eq!(lru.keys(), vec!["b", "a"]);
    }

    #[test]
    fn empty_key_is_allowed() {
        let mut lru = Lru::new(0);
        lru.put("", view("x"));
        assert_eq!(lru.get(""), Some(&view("x")));
        assert_eq!(lru.bytes(), 1);
    }

    // -----------------------------------------------------------------------
    // Accounting
    // -----------------------------------------------------------------------

    #[test]
    fn bytes_count_key_and_value() {
        let mut lru = Lru::new(0);
        lru.put("Tom", view("630"));
        lru.put("Jack", view("587"));
        assert_eq!(lru.bytes(), 3 + 3 + 4 + 3);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn replace_adjusts_by_delta() {
        let mut lru = Lru::new(0);
        lru.put("k", view("short"));
        lru.put("k", view("much longer"));
        assert_eq!(lru.len(), 1);
        assert_eq!(lru.bytes(), 1 + 11);
        lru.put("k", view("s"));
        assert_eq!(lru.bytes(), 2);
    }

    #[test]
    fn unbounded_never_evicts() {
        let mut lru = Lru::new(0);
        for i in 0..1000 {
            lru.put(&format!("key{i}"), view("some value bytes"));
        }
        assert_eq!(lru.len(), 1000);
    }

    // -----------------------------------------------------------------------
    // Eviction
    // -----------------------------------------------------------------------

    #[test]
    fn evicts_least_recently_used() {
        let (k1, k2, k3) = ("key1", "key2", "k3");
        let (v1, v2, v3) = ("value1", "value2", "v3");
        let cap = (k1.len() + k2.len() + v1.len() + v2.len()) as u64;
        let mut lru = Lru::new(cap);
        lru.put(k1, view(v1));
        lru.put(k2, view(v2));
        lru.put(k3, view(v3));

        assert!(!lru.contains(k1));
        assert!(lru.contains(k2));
        assert!(lru.contains(k3));
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn get_refreshes_recency() {
        // A, B, C fill the store exactly; touching A makes B the eviction victim.
        let mut lru = Lru::new(6);
        lru.put("A", view("a"));
        lru.put("B", view("b"));
        lru.put("C", view("c"));
        assert_eq!(lru.bytes(), 6);

        assert!(lru.get("A").is_some());
        lru.put("D", view("d"));

        assert!(lru.contains("A"));
        assert!(!lru.contains("B"));
        assert!(lru.contains("C"));
        assert!(lru.contains("D"));
    }

    #[test]
    fn evicts_as_many_as_needed() {
        let mut lru = Lru::new(10);
        lru.put("a", view("1"));
        lru.put("b", view("2"));
        lru.put("c", view("3"));
        lru.put("big", view("1234567"));
        assert_eq!(lru.keys(), vec!["big"]);
        assert_eq!(lru.bytes(), 10);
    }

    #[test]
    fn oversized_entry_is_dropped() {
        let mut lru = Lru::new(4);
        lru.put("key", view("too large"));
        assert!(lru.is_empty());
        assert_eq!(lru.bytes(), 0);
    }

    #[test]
    fn eviction_callback_sees_evicted_entries() {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let mut lru: Lru<ByteView> = Lru::with_eviction_callback(
            10,
            Box::new(move |key, _value| sink.lock().unwrap().push(key.to_string())),
        );
        lru.put("key1", view("123456"));
        lru.put("k2", view("k2"));
        lru.put("k3", view("k3"));
        lru.put("k4", view("k4"));

        assert_eq!(*evicted.lock().unwrap(), vec!["key1", "k2"]);
    }

    #[test]
    fn remove_oldest_on_empty() {
        let mut lru: Lru<ByteView> = Lru::new(0);
        assert!(lru.remove_oldest().is_none());
    }

    #[test]
    fn slots_are_reused_after_eviction() {
        let mut lru = Lru::new(4);
        for i in 0..100 {
            lru.put(&format!("{}", i % 10), view("x"));
        }
        assert!(lru.nodes.len() <= 3);
        assert!(lru.bytes() <= 4);
    }

    #[test]
    fn debug_format() {
        let mut lru = Lru::new(64);
        lru.put("k", view("v"));
        let debug = format!("{lru:?}");
        assert!(debug.contains("Lru"));
        assert!(debug.contains("used_bytes"));
    }

    proptest! {
        #[test]
        fn byte_budget_always_holds(
            max in 1u64..64,
            ops in proptest::collection::vec(("[a-f]{0,4}", proptest::collection::vec(any::<u8>(), 0..16)), 1..200),
        ) {
            let mut lru = Lru::new(max);
            for (key, value) in ops {
                lru.put(&key, ByteView::from(value));
                prop_assert!(lru.bytes() <= max);
                let recount: u64 = lru
                    .keys()
                    .iter()
                    .map(|k| (k.len() + lru.nodes[lru.index[k]].as_ref().unwrap().value.len()) as u64)
                    .sum();
                prop_assert_eq!(recount, lru.bytes());
            }
        }
    }
}
