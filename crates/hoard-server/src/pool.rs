use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use hoard_group::{PeerGetter, PeerPicker};
use hoard_ring::HashRing;
use tracing::{debug, info};

use crate::client::HttpPeerClient;
use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Builds the client used to reach a peer, given its base URL.
pub type PeerConnector = Arc<dyn Fn(&str) -> Arc<dyn PeerGetter> + Send + Sync>;

struct RouterState {
    ring: HashRing,
    clients: HashMap<String, Arc<dyn PeerGetter>>,
}

/// Decides which node owns a key and hands out a client for remote owners.
///
/// The ring and the client table are replaced together, so a lookup never
/// sees a ring entry without its client.
pub struct PeerRouter {
    self_url: String,
    replicas: usize,
    connector: PeerConnector,
    state: Mutex<RouterState>,
}

impl PeerRouter {
    pub fn new(self_url: &str, replicas: usize, connector: PeerConnector) -> Self {
        Self {
            self_url: self_url.to_string(),
            replicas,
            connector,
            state: Mutex::new(RouterState {
                ring: HashRing::new(replicas),
                clients: HashMap::new(),
            }),
        }
    }

    /// Router whose peers are reached with [`HttpPeerClient`]s sharing one
    /// connection pool, already configured with `config.peers`.
    pub fn http(config: &ServerConfig) -> ServerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let base_path = config.base_path.clone();
        let connector: PeerConnector = Arc::new(move |peer: &str| {
            Arc::new(HttpPeerClient::with_client(peer, &base_path, client.clone()))
                as Arc<dyn PeerGetter>
        });
        let router = Self::new(&config.self_url, config.replicas, connector);
        router.set_peers(&config.peers);
        Ok(router)
    }

    /// Replace the peer set. The previous ring and clients are discarded.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();
        let mut ring = HashRing::new(self.replicas);
        ring.add(&peers);
        let clients = peers
            .iter()
            .map(|peer| (peer.clone(), (self.connector)(peer)))
            .collect();

        *self.state.lock().expect("peer router lock poisoned") = RouterState { ring, clients };
        info!(self_url = %self.self_url, peers = peers.len(), "peer set configured");
    }

    /// Client for the remote owner of `key`, or `None` when this node owns it
    /// or no peers are configured.
    pub fn route(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock().expect("peer router lock poisoned");
        let owner = state.ring.get(key)?;
        if owner == self.self_url {
            return None;
        }
        debug!(key, peer = owner, "routing to remote owner");
        state.clients.get(owner).cloned()
    }

    /// Base URL of the node owning `key`, this node included.
    pub fn owner(&self, key: &str) -> Option<String> {
        let state = self.state.lock().expect("peer router lock poisoned");
        state.ring.get(key).map(str::to_string)
    }

    pub fn self_url(&self) -> &str {
        &self.self_url
    }

    /// Configured peers, sorted.
    pub fn peers(&self) -> Vec<String> {
        self.state.lock().expect("peer router lock poisoned").ring.peers()
    }
}

impl PeerPicker for PeerRouter {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        self.route(key)
    }
}

impl fmt::Debug for PeerRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerRouter")
            .field("self_url", &self.self_url)
            .field("replicas", &self.replicas)
            .field("peers", &self.peers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use hoard_group::{GetterFn, Registry};
    use hoard_types::{ByteView, CacheError, CacheResult};

    const A: &str = "http://10.0.0.1:8001";
    const B: &str = "http://10.0.0.2:8002";
    const C: &str = "http://10.0.0.3:8003";

    struct StubPeer {
        peer: String,
        value: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PeerGetter for StubPeer {
        fn peer(&self) -> &str {
            &self.peer
        }

        async fn get(&self, _namespace: &str, key: &str) -> CacheResult<ByteView> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.value {
                Some(v) => Ok(ByteView::from(v)),
                None => Err(CacheError::upstream(&self.peer, format!("refused {key}"))),
            }
        }
    }

    fn connector(value: Option<&'static str>, calls: Arc<AtomicUsize>) -> PeerConnector {
        Arc::new(move |peer: &str| {
            Arc::new(StubPeer {
                peer: peer.to_string(),
                value,
                calls: Arc::clone(&calls),
            }) as Arc<dyn PeerGetter>
        })
    }

    /// First key in a deterministic sequence whose owner is not `self_url`.
    fn remote_key(peers: &[&str], self_url: &str) -> String {
        let mut ring = HashRing::default();
        ring.add(peers);
        (0..)
            .map(|i| format!("key-{i}"))
            .find(|k| ring.get(k) != Some(self_url))
            .unwrap()
    }

    #[test]
    fn empty_ring_routes_locally() {
        let router = PeerRouter::new(A, 50, connector(None, Arc::default()));
        assert!(router.route("Tom").is_none());
        assert!(router.owner("Tom").is_none());
        assert!(router.peers().is_empty());
    }

    #[test]
    fn self_owned_keys_route_locally() {
        let router = PeerRouter::new(A, 50, connector(None, Arc::default()));
        router.set_peers([A]);
        assert_eq!(router.owner("Tom").as_deref(), Some(A));
        assert!(router.route("Tom").is_none());
    }

    #[test]
    fn remote_keys_get_owner_client() {
        let router = PeerRouter::new(A, 50, connector(None, Arc::default()));
        router.set_peers([A, B, C]);
        let key = remote_key(&[A, B, C], A);

        let owner = router.owner(&key).unwrap();
        let client = router.route(&key).expect("remote owner");
        assert_eq!(client.peer(), owner);
        assert_ne!(owner, A);
    }

    #[test]
    fn routing_matches_independent_ring() {
        let router = PeerRouter::new(B, 50, connector(None, Arc::default()));
        router.set_peers([A, B, C]);
        let mut ring = HashRing::new(50);
        ring.add([A, B, C]);
        for i in 0..500 {
            let key = format!("user:{i}");
            assert_eq!(router.owner(&key).as_deref(), ring.get(&key));
        }
    }

    #[test]
    fn set_peers_replaces_previous_set() {
        let router = PeerRouter::new(A, 50, connector(None, Arc::default()));
        router.set_peers([A, B]);
        router.set_peers([A, C]);
        assert_eq!(router.peers(), vec![A.to_string(), C.to_string()]);
        for i in 0..200 {
            assert_ne!(router.owner(&format!("k{i}")).as_deref(), Some(B));
        }
    }

    #[test]
    fn set_peers_builds_one_client_per_peer() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let connector: PeerConnector = Arc::new(move |peer: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(StubPeer {
                peer: peer.to_string(),
                value: None,
                calls: Arc::default(),
            }) as Arc<dyn PeerGetter>
        });
        let router = PeerRouter::new(A, 50, connector);
        router.set_peers([A, B, C]);
        assert_eq!(built.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn group_reads_through_remote_owner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Arc::new(PeerRouter::new(A, 50, connector(Some("remote"), Arc::clone(&calls))));
        router.set_peers([A, B, C]);

        let registry = Registry::new();
        let group = registry.register("scores", 0, GetterFn(|_: &str| Ok(b"local".to_vec())));
        group.register_peers(router);

        let key = remote_key(&[A, B, C], A);
        let value = group.get(&key).await.unwrap();
        assert_eq!(value.as_slice(), b"remote");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(group.cache_len(), 0);
    }

    #[tokio::test]
    async fn failing_owner_falls_back_to_source() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Arc::new(PeerRouter::new(A, 50, connector(None, Arc::clone(&calls))));
        router.set_peers([A, B, C]);

        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let registry = Registry::new();
        let group = registry.register(
            "scores",
            0,
            GetterFn(move |key: &str| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!("db:{key}").into_bytes())
            }),
        );
        group.register_peers(router);

        let key = remote_key(&[A, B, C], A);
        let value = group.get(&key).await.unwrap();
        assert_eq!(value.to_string_lossy(), format!("db:{key}"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        let stats = group.stats();
        assert_eq!(stats.peer_errors, 1);
        assert_eq!(stats.local_loads, 1);
    }

    #[test]
    fn http_router_from_config() {
        let config = ServerConfig {
            self_url: A.into(),
            peers: vec![A.into(), B.into()],
            ..Default::default()
        };
        let router = PeerRouter::http(&config).unwrap();
        assert_eq!(router.self_url(), A);
        assert_eq!(router.peers().len(), 2);
    }
}
