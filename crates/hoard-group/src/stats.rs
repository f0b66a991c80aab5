use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters describing one group's traffic.
#[derive(Debug, Default)]
pub struct GroupStats {
    gets: AtomicU64,
    hits: AtomicU64,
    loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_errors: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time copy of [`GroupStats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Lookups with a non-empty key.
    pub gets: u64,
    /// Lookups answered from the local store.
    pub hits: u64,
    /// Coalesced load executions (misses after deduplication).
    pub loads: u64,
    /// Values obtained from a remote peer.
    pub peer_loads: u64,
    /// Peer fetches that failed and fell back to the backing source.
    pub peer_errors: u64,
    /// Successful backing source calls.
    pub local_loads: u64,
    /// Failed backing source calls.
    pub local_errors: u64,
    /// Entries evicted from the local store.
    pub evictions: u64,
}

impl GroupStats {
    pub(crate) fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local_error(&self) {
        self.local_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            local_errors: self.local_errors.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let stats = GroupStats::default();
        stats.record_get();
        stats.record_get();
        stats.record_hit();
        stats.record_eviction();
        let snap = stats.snapshot();
        assert_eq!(snap.gets, 2);
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.loads, 0);
    }
}
