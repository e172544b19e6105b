//! # HTTP Server
//!
//! Combines the document, version and observability routers behind CORS
//! and request tracing.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::config::HttpServerConfig;
use super::document_routes::document_routes;
use super::observability_routes::{health_routes, observability_routes};
use super::version_routes::version_routes;
use crate::observability::Event;
use crate::versioning::VersionService;

/// HTTP server for the versioning API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Server over a fresh in-memory service
    pub fn new() -> Self {
        Self::with_service(HttpServerConfig::default(), Arc::new(VersionService::in_memory()))
    }

    pub fn with_service(config: HttpServerConfig, service: Arc<VersionService>) -> Self {
        let router = Self::build_router(&config, service);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, service: Arc<VersionService>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| match s.parse() {
                    Ok(origin) => Some(origin),
                    Err(_) => {
                        warn!(origin = %s, "ignoring unparsable CORS origin");
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let metrics = Arc::clone(service.metrics());
        let api = Router::new()
            .merge(document_routes(Arc::clone(&service)))
            .merge(version_routes(service));

        Router::new()
            .merge(health_routes())
            .nest("/observability", observability_routes(metrics))
            .nest("/api", api)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
    }

    pub fn bind_address(&self) -> String {
        self.config.bind_address()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Binds and serves until the listener fails.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;
        info!(event = %Event::Serving, address = %addr, "HTTP server listening");
        axum::serve(listener, self.router).await
    }
}

impl Default for HttpServer {
    fn default() -> Self {
        Self::new()
    }
}
