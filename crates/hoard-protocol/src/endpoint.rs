/// Path prefix under which peers serve cache lookups.
pub const DEFAULT_BASE_PATH: &str = "/_cache/";

/// HTTP endpoint paths besides the peer lookup path.
pub mod endpoints {
    /// Front-end lookup: `GET /api?namespace=<ns>&key=<key>`.
    pub const API: &str = "/api";
    pub const HEALTH: &str = "/health";
    /// Per-namespace counters as JSON.
    pub const STATS: &str = "/stats";
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
