//! HTTP transport for hoard.
//!
//! Each node serves its namespaces to peers under a base path, routes misses
//! to the owning peer over a consistent-hash ring, and exposes a front-end
//! lookup endpoint for applications.

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod pool;
pub mod router;
pub mod server;

pub use client::HttpPeerClient;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use pool::{PeerConnector, PeerRouter};
pub use router::{build_api_router, build_router, AppState};
pub use server::CacheServer;
