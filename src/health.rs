//! Liveness endpoint.
//!
//! A single static route so a hosting platform's port check succeeds while
//! the bot is polling. It never touches the store or the chat client.

use axum::{Router, routing::get};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

/// Body returned by `GET /`.
pub const ALIVE_TEXT: &str = "Bot is live!";

async fn alive() -> &'static str {
    ALIVE_TEXT
}

/// Build the liveness router.
pub fn build_router() -> Router {
    Router::new()
        .route("/", get(alive))
        .layer(TraceLayer::new_for_http())
}

/// Start the liveness server on `addr`.
pub async fn start_server(addr: SocketAddr) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    crate::http::spawn_server("Liveness server", build_router(), addr).await
}
