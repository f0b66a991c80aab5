//! Peer wire protocol for the hoard cache.
//!
//! The protocol has exactly one read operation. A request names a
//! `(namespace, key)` pair in the URL path:
//!
//! ```text
//! GET <base_path><escape(namespace)>/<escape(key)>
//! ```
//!
//! A successful response body is a bincode-encoded [`PeerResponse`] whose only
//! field is the raw value bytes (length-prefixed, binary-safe).

pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;

pub use codec::PeerCodec;
pub use endpoint::{endpoints, HealthResponse, DEFAULT_BASE_PATH};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{PeerRequest, PeerResponse, MAX_VALUE_SIZE};
