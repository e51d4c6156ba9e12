//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{events, health, items, payloads};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::ConnectorClient;
use crate::domain::ProvenanceService;

/// Full application router
pub fn router(
    provenance: Arc<ProvenanceService>,
    connector: Option<Arc<ConnectorClient>>,
    allowed_origins: &AllowedOrigins,
) -> Router {
    Router::new()
        .route("/api/v1/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest("/api/v1/items", items::routes(provenance.clone()))
        .nest("/api/v1/events", events::routes(provenance))
        .nest("/api/v1/payloads", payloads::routes(connector))
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown is triggered; returns the app for cleanup
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let ip = host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .with_context(|| format!("Invalid server host: {}", host))?;
        let addr = SocketAddr::new(ip, port);

        let allowed_origins = AllowedOrigins::new(&host, port);
        let router = router(app.provenance.clone(), app.connector.clone(), &allowed_origins);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::debug!(%addr, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::debug!("HTTP server stopped");
        Ok(app)
    }
}
