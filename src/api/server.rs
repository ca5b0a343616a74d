//! HTTP server implementation for the REST API.

use axum::{Json, Router, routing::get};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::tasks;
use crate::db::Database;

/// API state shared across handlers.
#[derive(Clone)]
pub struct ApiServer {
    /// Reference to the task database.
    db: Database,
}

impl ApiServer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Database {
        &self.db
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with all routes.
pub fn build_router(db: Database) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/tasks/", get(tasks::list).post(tasks::create))
        // Static segment wins over the `{task_id}` capture
        .route("/tasks/stats/", get(tasks::stats))
        .route(
            "/tasks/{task_id}/",
            get(tasks::retrieve)
                .put(tasks::replace)
                .patch(tasks::partial_update)
                .delete(tasks::destroy),
        )
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ApiServer::new(db))
}

/// Start the API server on `addr`.
pub async fn start_server(
    db: Database,
    addr: SocketAddr,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    crate::http::spawn_server("API server", build_router(db), addr).await
}
