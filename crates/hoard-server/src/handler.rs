use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use hoard_group::StatsSnapshot;
use hoard_protocol::{HealthResponse, PeerCodec, PeerRequest, PeerResponse};

use crate::error::ServerError;
use crate::router::AppState;

/// Peer lookup: `GET <base_path><namespace>/<key>`.
///
/// Answers with the encoded value, 400 for a malformed path, 404 for an
/// unknown namespace, and 500 when the lookup itself fails.
pub async fn peer_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let request = match PeerRequest::parse(state.base_path(), uri.path()) {
        Ok(request) => request,
        Err(err) => return ServerError::from(err).into_response(),
    };
    debug!(namespace = %request.namespace, key = %request.key, "peer lookup");

    let Some(group) = state.registry().resolve(&request.namespace) else {
        return (
            StatusCode::NOT_FOUND,
            format!("no such namespace: {}", request.namespace),
        )
            .into_response();
    };

    let value = match group.get(&request.key).await {
        Ok(value) => value,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };
    match PeerCodec::encode(&PeerResponse::new(value.to_vec())) {
        Ok(body) => ([(header::CONTENT_TYPE, PeerCodec::CONTENT_TYPE)], body).into_response(),
        Err(err) => ServerError::from(err).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiQuery {
    pub namespace: Option<String>,
    pub key: Option<String>,
}

/// Front-end lookup returning the raw value bytes.
pub async fn api_handler(State(state): State<AppState>, Query(query): Query<ApiQuery>) -> Response {
    let (Some(namespace), Some(key)) = (query.namespace, query.key) else {
        return (
            StatusCode::BAD_REQUEST,
            "namespace and key query parameters are required",
        )
            .into_response();
    };
    let Some(group) = state.registry().resolve(&namespace) else {
        return (StatusCode::NOT_FOUND, format!("no such namespace: {namespace}")).into_response();
    };
    match group.get(&key).await {
        Ok(value) => (
            [(header::CONTENT_TYPE, PeerCodec::CONTENT_TYPE)],
            value.to_vec(),
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Counters for every registered namespace.
pub async fn stats_handler(State(state): State<AppState>) -> Json<BTreeMap<String, StatsSnapshot>> {
    let registry = state.registry();
    let stats: BTreeMap<String, StatsSnapshot> = registry
        .names()
        .into_iter()
        .filter_map(|name| {
            let group = registry.resolve(&name)?;
            Some((name, group.stats()))
        })
        .collect();
    Json(stats)
}

/// Node summary.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "hoard",
        "version": env!("CARGO_PKG_VERSION"),
        "base_path": state.base_path(),
        "namespaces": state.registry().names(),
    }))
}
