use std::fmt;
use std::sync::{Arc, OnceLock};

use hoard_flight::CallGroup;
use hoard_store::BoundedStore;
use hoard_types::{ByteView, CacheError, CacheResult};
use tracing::{debug, warn};

use crate::getter::Getter;
use crate::peers::{PeerGetter, PeerPicker};
use crate::stats::{GroupStats, StatsSnapshot};

/// A named cache namespace.
///
/// Lookups hit the local [`BoundedStore`] first. Misses are coalesced per key
/// and loaded either from the peer that owns the key or, when this node owns
/// it or the peer fails, from the backing [`Getter`]. Only locally loaded
/// values are stored here; values fetched from a peer stay authoritative on
/// that peer.
pub struct Group {
    name: String,
    getter: Box<dyn Getter>,
    main_cache: BoundedStore<ByteView>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: CallGroup<CacheResult<ByteView>>,
    stats: Arc<GroupStats>,
}

impl Group {
    pub(crate) fn new(name: &str, cache_bytes: u64, getter: Box<dyn Getter>) -> Self {
        let stats = Arc::new(GroupStats::default());
        let eviction_stats = Arc::clone(&stats);
        Self {
            name: name.to_string(),
            getter,
            main_cache: BoundedStore::with_eviction_callback(
                cache_bytes,
                Box::new(move |_: &str, _: &ByteView| eviction_stats.record_eviction()),
            ),
            peers: OnceLock::new(),
            loader: CallGroup::new(),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach the peer picker used to route misses.
    ///
    /// # Panics
    ///
    /// Panics if a picker is already attached; wiring peers twice is a
    /// configuration bug.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for namespace {:?}", self.name);
        }
    }

    /// Look up `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> CacheResult<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidArgument(format!(
                "key is required (namespace {:?})",
                self.name
            )));
        }
        self.stats.record_get();

        if let Some(value) = self.main_cache.get(key) {
            debug!(namespace = %self.name, key, "cache hit");
            self.stats.record_hit();
            return Ok(value);
        }

        self.load(key).await
    }

    async fn load(&self, key: &str) -> CacheResult<ByteView> {
        self.loader
            .run(key, || async {
                self.stats.record_load();
                if let Some(peer) = self.peers.get().and_then(|picker| picker.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => {
                            self.stats.record_peer_load();
                            return Ok(value);
                        }
                        Err(err) => {
                            self.stats.record_peer_error();
                            warn!(
                                namespace = %self.name,
                                key,
                                peer = peer.peer(),
                                error = %err,
                                "peer fetch failed, loading locally"
                            );
                        }
                    }
                }
                self.get_locally(key).await
            })
            .await
    }

    async fn get_locally(&self, key: &str) -> CacheResult<ByteView> {
        let bytes = match self.getter.get(key).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_local_error();
                return Err(err);
            }
        };
        self.stats.record_local_load();
        // The getter hands over ownership, so the view cannot alias a buffer
        // the application still holds.
        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> CacheResult<ByteView> {
        debug!(namespace = %self.name, key, peer = peer.peer(), "fetching from peer");
        peer.get(&self.name, key).await
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.put(key, value);
    }

    /// Entries currently held in the local store.
    pub fn cache_len(&self) -> usize {
        self.main_cache.len()
    }

    /// Bytes currently held in the local store.
    pub fn cache_bytes(&self) -> u64 {
        self.main_cache.bytes()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("main_cache", &self.main_cache)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
