use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::hasher::{default_hash, HashFn};

/// Virtual nodes per peer when none is configured.
pub const DEFAULT_REPLICAS: usize = 50;

/// Consistent-hash ring mapping keys to peer identities.
///
/// Each peer contributes `replicas` points, hashed from `"{index}{peer}"`.
/// Points are kept sorted and unique; when two registrations land on the same
/// point the later one owns it and a warning is logged.
#[derive(Clone)]
pub struct HashRing {
    replicas: usize,
    hash: HashFn,
    points: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl HashRing {
    /// Empty ring hashing with CRC-32.
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, default_hash())
    }

    /// Empty ring using a custom hash function.
    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            replicas,
            hash,
            points: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Place each peer on the ring.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let point = (self.hash)(format!("{i}{peer}").as_bytes());
                match self.owners.insert(point, peer.to_string()) {
                    None => self.points.push(point),
                    Some(previous) if previous != peer => {
                        warn!(point, previous = %previous, peer, "hash ring collision, later peer wins");
                    }
                    Some(_) => {}
                }
            }
        }
        self.points.sort_unstable();
    }

    /// Peer owning `key`, or `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.points.partition_point(|&point| point < hash);
        let point = self.points[idx % self.points.len()];
        self.owners.get(&point).map(String::as_str)
    }

    /// Returns `true` if no peer has been added.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Virtual nodes per peer.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Distinct peers present on the ring, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.owners.values().cloned().collect();
        peers.sort();
        peers.dedup();
        peers
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS)
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("points", &self.points.len())
            .field("peers", &self.peers())
            .finish()
    }
}
