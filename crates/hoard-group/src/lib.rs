//! Namespace orchestration for the hoard cache.
//!
//! A [`Group`] is one named cache partition. A lookup is served from the
//! group's bounded store when possible; on a miss a single coalesced load
//! either asks the peer owning the key or calls the application's
//! [`Getter`], and locally loaded values populate the store.
//!
//! Groups are created through a [`Registry`], which is also how a peer server
//! resolves the namespace named in an incoming request.

pub mod getter;
pub mod group;
pub mod peers;
pub mod registry;
pub mod stats;

pub use getter::{Getter, GetterFn};
pub use group::Group;
pub use peers::{PeerGetter, PeerPicker};
pub use registry::Registry;
pub use stats::{GroupStats, StatsSnapshot};
