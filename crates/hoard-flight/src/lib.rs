//! Single-flight call coalescing for the hoard cache.
//!
//! When many tasks miss on the same cold key at once, only one of them should
//! reach the backing source. [`CallGroup::run`] executes the supplied work for
//! the first caller of a key and parks every concurrent caller of the same key
//! until that work finishes, handing each of them a clone of the result.

pub mod group;

pub use group::CallGroup;
