use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use hoard_group::Registry;
use hoard_protocol::endpoints;
use tower_http::trace::TraceLayer;

use crate::handler;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    registry: Arc<Registry>,
    base_path: Arc<str>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, base_path: &str) -> Self {
        Self {
            registry,
            base_path: Arc::from(base_path),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

/// Router for a cache node: the peer lookup path plus the front-end and
/// operational endpoints.
pub fn build_router(state: AppState) -> Router {
    let peer_route = format!("{}*rest", state.base_path());
    // A wildcard never matches an empty tail, so the bare base path gets its
    // own route and is rejected by the handler as malformed.
    Router::new()
        .route(state.base_path(), get(handler::peer_handler))
        .route(&peer_route, get(handler::peer_handler))
        .route(endpoints::API, get(handler::api_handler))
        .route(endpoints::HEALTH, get(handler::health_handler))
        .route(endpoints::STATS, get(handler::stats_handler))
        .route("/info", get(handler::info_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router exposing only the front-end lookup, for a separate API listener.
pub fn build_api_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::API, get(handler::api_handler))
        .route(endpoints::HEALTH, get(handler::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
