use std::sync::Arc;

use hoard_group::Registry;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::pool::PeerRouter;
use crate::router::{build_api_router, build_router, AppState};

/// A cache node serving the namespaces of one registry.
pub struct CacheServer {
    config: ServerConfig,
    registry: Arc<Registry>,
}

impl CacheServer {
    pub fn new(config: ServerConfig, registry: Arc<Registry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn state(&self) -> AppState {
        AppState::new(Arc::clone(&self.registry), &self.config.base_path)
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state())
    }

    /// Route misses of every registered namespace through an HTTP peer router
    /// built from the configured peer list.
    ///
    /// Namespaces registered afterwards are not wired.
    pub fn attach_peers(&self) -> ServerResult<Arc<PeerRouter>> {
        let router = Arc::new(PeerRouter::http(&self.config)?);
        for name in self.registry.names() {
            if let Some(group) = self.registry.resolve(&name) {
                group.register_peers(router.clone());
            }
        }
        Ok(router)
    }

    /// Start serving requests on the configured addresses.
    pub async fn serve(self) -> ServerResult<()> {
        self.config.validate()?;
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        match self.config.api_addr {
            Some(api_addr) => {
                let api_listener = TcpListener::bind(api_addr).await?;
                info!("hoard API listening on {}", api_addr);
                let api = build_api_router(self.state());
                tokio::try_join!(
                    self.serve_with_listener(listener),
                    async {
                        axum::serve(api_listener, api)
                            .await
                            .map_err(|e| ServerError::Internal(e.to_string()))
                    }
                )?;
                Ok(())
            }
            None => self.serve_with_listener(listener).await,
        }
    }

    /// Serve the peer router on an already bound listener.
    pub async fn serve_with_listener(&self, listener: TcpListener) -> ServerResult<()> {
        let addr = listener.local_addr()?;
        info!(
            "hoard node {} listening on {} (namespaces: {})",
            self.config.self_url,
            addr,
            self.registry.names().join(", ")
        );
        axum::serve(listener, self.router())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_group::GetterFn;

    #[test]
    fn server_construction() {
        let server = CacheServer::new(ServerConfig::default(), Arc::new(Registry::new()));
        assert_eq!(server.config().bind_addr, "127.0.0.1:8001".parse().unwrap());
        assert!(server.registry().is_empty());
    }

    #[test]
    fn router_builds() {
        let server = CacheServer::new(ServerConfig::default(), Arc::new(Registry::new()));
        let _router = server.router();
    }

    #[test]
    fn attach_peers_wires_registered_namespaces() {
        let registry = Arc::new(Registry::new());
        let scores = registry.register("scores", 0, GetterFn(|_: &str| Ok(Vec::new())));
        let config = ServerConfig {
            peers: vec!["http://127.0.0.1:8001".into(), "http://127.0.0.1:8002".into()],
            ..Default::default()
        };
        let server = CacheServer::new(config, registry);
        let router = server.attach_peers().unwrap();
        assert_eq!(router.peers().len(), 2);

        // The group already has a picker, so wiring it again must panic.
        let again = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            scores.register_peers(router.clone());
        }));
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn serve_rejects_invalid_config() {
        let config = ServerConfig {
            replicas: 0,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        };
        let err = CacheServer::new(config, Arc::new(Registry::new()))
            .serve()
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
