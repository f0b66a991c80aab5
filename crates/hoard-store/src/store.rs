use std::fmt;
use std::sync::Mutex;

use crate::lru::{EvictionCallback, Lru};
use crate::traits::ByteSize;

/// Thread-safe, byte-bounded LRU store.
///
/// Every operation takes the single store mutex for its whole duration, so a
/// lookup and the recency update it causes are atomic with respect to other
/// callers. Values are cloned out on read; for [`ByteView`](hoard_types::ByteView)
/// that is a cheap handle copy of immutable bytes.
pub struct BoundedStore<V> {
    inner: Mutex<Lru<V>>,
}

impl<V: ByteSize + Clone> BoundedStore<V> {
    /// Create an empty store with the given byte budget (`0` = unbounded).
    pub fn new(max_bytes: u64) -> Self {
        Self {
            inner: Mutex::new(Lru::new(max_bytes)),
        }
    }

    /// Create an empty store that reports evictions to `on_evicted`.
    ///
    /// The callback runs while the store lock is held; keep it short and
    /// never call back into the same store from it.
    pub fn with_eviction_callback(max_bytes: u64, on_evicted: EvictionCallback<V>) -> Self {
        Self {
            inner: Mutex::new(Lru::with_eviction_callback(max_bytes, on_evicted)),
        }
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut lru = self.inner.lock().expect("store lock poisoned");
        lru.get(key).cloned()
    }

    /// Insert or replace `key`, evicting cold entries beyond the byte budget.
    pub fn put(&self, key: &str, value: V) {
        self.inner.lock().expect("store lock poisoned").put(key, value);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("store lock poisoned").is_empty()
    }

    /// Bytes currently accounted.
    pub fn bytes(&self) -> u64 {
        self.inner.lock().expect("store lock poisoned").bytes()
    }

    /// Configured byte budget; `0` means unbounded.
    pub fn max_bytes(&self) -> u64 {
        self.inner.lock().expect("store lock poisoned").max_bytes()
    }
}

impl<V> fmt::Debug for BoundedStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.lock() {
            Ok(lru) => f.debug_struct("BoundedStore").field("lru", &*lru).finish(),
            Err(_) => f.debug_struct("BoundedStore").field("lru", &"<poisoned>").finish(),
        }
    }
}
