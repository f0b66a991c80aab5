use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use hoard_protocol::DEFAULT_BASE_PATH;
use hoard_ring::DEFAULT_REPLICAS;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Configuration of one cache node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the peer endpoint listens on.
    pub bind_addr: SocketAddr,
    /// This node's own base URL as it appears in `peers`.
    pub self_url: String,
    /// Base URLs of every node in the fleet, this one included.
    pub peers: Vec<String>,
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring.
    pub replicas: usize,
    /// Timeout for a single peer fetch.
    pub request_timeout_ms: u64,
    /// Optional separate listener serving only the front-end API.
    pub api_addr: Option<SocketAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8001)),
            self_url: "http://127.0.0.1:8001".into(),
            peers: Vec::new(),
            base_path: DEFAULT_BASE_PATH.into(),
            replicas: DEFAULT_REPLICAS,
            request_timeout_ms: 3_000,
            api_addr: None,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; absent fields take their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if !self.base_path.starts_with('/') || !self.base_path.ends_with('/') {
            return Err(ServerError::Config(format!(
                "base_path {:?} must start and end with '/'",
                self.base_path
            )));
        }
        if self.replicas == 0 {
            return Err(ServerError::Config("replicas must be at least 1".into()));
        }
        if !self.peers.is_empty() && !self.peers.iter().any(|p| p == &self.self_url) {
            return Err(ServerError::Config(format!(
                "self_url {:?} is not in the peer list",
                self.self_url
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
