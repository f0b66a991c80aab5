use std::time::Duration;

use async_trait::async_trait;
use hoard_group::PeerGetter;
use hoard_protocol::{PeerCodec, PeerRequest};
use hoard_types::{ByteView, CacheError, CacheResult};
use tracing::debug;

use crate::error::ServerResult;

/// Fetches values from one remote peer over HTTP.
#[derive(Clone, Debug)]
pub struct HttpPeerClient {
    peer: String,
    base_path: String,
    client: reqwest::Client,
}

impl HttpPeerClient {
    /// Client with its own connection pool and the given request timeout.
    pub fn new(peer: &str, base_path: &str, timeout: Duration) -> ServerResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(peer, base_path, client))
    }

    /// Client sharing an existing connection pool.
    pub fn with_client(peer: &str, base_path: &str, client: reqwest::Client) -> Self {
        Self {
            peer: peer.to_string(),
            base_path: base_path.to_string(),
            client,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

#[async_trait]
impl PeerGetter for HttpPeerClient {
    fn peer(&self) -> &str {
        &self.peer
    }

    async fn get(&self, namespace: &str, key: &str) -> CacheResult<ByteView> {
        let url = PeerRequest::new(namespace, key).url(&self.peer, &self.base_path);
        debug!(%url, "peer request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CacheError::upstream(&self.peer, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CacheError::upstream(
                &self.peer,
                format!("server returned {status}: {}", detail.trim()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::upstream(&self.peer, format!("reading response body: {e}")))?;
        let decoded = PeerCodec::decode(&body)
            .map_err(|e| CacheError::upstream(&self.peer, format!("decoding response body: {e}")))?;
        Ok(ByteView::from(decoded.value))
    }
}
