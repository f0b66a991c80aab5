use std::sync::Arc;

use async_trait::async_trait;
use hoard_types::{ByteView, CacheResult};

/// Client handle for fetching values from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    /// Identity of the peer this handle talks to (its base URL).
    fn peer(&self) -> &str;

    /// Fetch `key` from `namespace` on the remote peer.
    ///
    /// Any failure is reported as [`CacheError::Upstream`](hoard_types::CacheError::Upstream).
    async fn get(&self, namespace: &str, key: &str) -> CacheResult<ByteView>;
}

/// Decides which peer owns a key.
pub trait PeerPicker: Send + Sync {
    /// Client for the remote owner of `key`, or `None` when the key should be
    /// served by this node.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
