//! Foundation types for the hoard distributed cache.
//!
//! Every other hoard crate depends on `hoard-types`.
//!
//! # Key Types
//!
//! - [`ByteView`]: immutable snapshot of a cached value
//! - [`CacheError`]: the error taxonomy surfaced by cache lookups

pub mod error;
pub mod view;

pub use error::{CacheError, CacheResult};
pub use view::ByteView;
