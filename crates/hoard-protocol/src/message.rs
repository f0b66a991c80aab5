use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, ProtocolResult};

/// Largest value a peer response may carry.
pub const MAX_VALUE_SIZE: usize = 64 * 1024 * 1024;

/// A lookup of `key` inside `namespace` on a remote peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerRequest {
    pub namespace: String,
    pub key: String,
}

impl PeerRequest {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Request path under `base_path`, with both segments percent-escaped.
    pub fn path(&self, base_path: &str) -> String {
        format!(
            "{}{}/{}",
            base_path,
            urlencoding::encode(&self.namespace),
            urlencoding::encode(&self.key)
        )
    }

    /// Full request URL against a peer's base URL (`http://host:port`).
    pub fn url(&self, peer: &str, base_path: &str) -> String {
        format!("{}{}", peer.trim_end_matches('/'), self.path(base_path))
    }

    /// Parse a raw (still escaped) request path.
    ///
    /// The remainder after `base_path` must split into exactly two segments at
    /// the first `/`; the key segment may itself contain further slashes.
    pub fn parse(base_path: &str, path: &str) -> ProtocolResult<Self> {
        let rest = path
            .strip_prefix(base_path)
            .ok_or_else(|| ProtocolError::OutsideBasePath {
                path: path.to_string(),
                base_path: base_path.to_string(),
            })?;
        let (namespace, key) = rest
            .split_once('/')
            .ok_or_else(|| ProtocolError::MalformedPath(path.to_string()))?;
        Ok(Self {
            namespace: unescape(namespace)?,
            key: unescape(key)?,
        })
    }
}

fn unescape(segment: &str) -> ProtocolResult<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ProtocolError::InvalidEscape(segment.to_string()))
}

/// Successful lookup response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerResponse {
    pub value: Vec<u8>,
}

impl PeerResponse {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub(crate) fn check_size(&self) -> ProtocolResult<()> {
        if self.value.len() > MAX_VALUE_SIZE {
            return Err(ProtocolError::ValueTooLarge {
                size: self.value.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        Ok(())
    }
}
