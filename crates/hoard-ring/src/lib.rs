//! Consistent hashing for the hoard cache.
//!
//! A [`HashRing`] places every peer at several points ("virtual nodes") on a
//! circular 32-bit hash space. A key belongs to the first peer point at or
//! after the key's own hash, wrapping to the smallest point. Two rings built
//! from the same peer list, replica count, and hash function always agree, so
//! every node in a fleet resolves the same owner for a key without
//! coordination.

pub mod hasher;
pub mod ring;

pub use hasher::{crc32, default_hash, HashFn};
pub use ring::{HashRing, DEFAULT_REPLICAS};
