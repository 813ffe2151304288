//! Webhook server.
//!
//! Provides HTTP endpoints for:
//! - Recording status callbacks
//! - Transcript-ready events
//! - Service info and health

pub mod error;
pub mod routes;

use crate::app::Pipeline;
use crate::config::ServerConfig;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

pub struct ApiServer {
    host: String,
    port: u16,
    pipeline: Arc<Pipeline>,
}

impl ApiServer {
    pub fn new(pipeline: Arc<Pipeline>, config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            pipeline,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.pipeline);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("Webhook server listening on http://{}", addr);
        info!("Endpoints:");
        info!("  GET  /                   - Service info");
        info!("  GET  /health             - Liveness check");
        info!("  POST /recording-status   - Recording status callback");
        info!("  POST /transcript-events  - Transcript-ready webhook");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Full application router, also used by the integration tests.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
        .merge(routes::recording::router(pipeline.clone()))
        .merge(routes::transcript::router(pipeline))
        .layer(ServiceBuilder::new())
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "crash-escalator",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
