use thiserror::Error;

/// Errors surfaced by cache lookups.
///
/// Every variant carries the offending key or namespace so the message alone
/// is enough to diagnose the failure. The type is `Clone` because a single
/// coalesced lookup hands the same result to every waiting caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The caller passed an argument the cache refuses (an empty key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A namespace or key does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Fetching from a peer failed (network, status, or decode error).
    #[error("peer {peer} failed: {reason}")]
    Upstream { peer: String, reason: String },

    /// The application's backing source returned an error.
    #[error("backing source failed for key {key:?}: {reason}")]
    Source { key: String, reason: String },
}

impl CacheError {
    /// Convenience constructor for a backing source reporting a missing key.
    pub fn key_not_found(key: &str) -> Self {
        Self::NotFound(format!("key {key:?} does not exist"))
    }

    /// Convenience constructor for a backing source failure.
    pub fn source(key: &str, reason: impl Into<String>) -> Self {
        Self::Source {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for a failed peer fetch.
    pub fn upstream(peer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Upstream {
            peer: peer.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures that came from a remote peer.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
