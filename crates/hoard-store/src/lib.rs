//! Byte-bounded LRU storage for the hoard cache.
//!
//! A store maps string keys to values and accounts for the bytes they occupy
//! (key length plus value length). When a configured byte budget is exceeded
//! the least-recently-used entries are evicted until the budget holds again.
//! A budget of `0` means unbounded.
//!
//! # Types
//!
//! - [`Lru`] -- the unsynchronised recency list plus key index
//! - [`BoundedStore`] -- an [`Lru`] behind a single mutex, safe to share
//! - [`ByteSize`] -- how a value reports its size
//!
//! The store knows nothing about namespaces, peers, or backing sources.

pub mod lru;
pub mod store;
pub mod traits;

pub use lru::{EvictionCallback, Lru};
pub use store::BoundedStore;
pub use traits::ByteSize;
