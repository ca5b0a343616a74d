//! Shared axum serving harness.

use axum::Router;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tracing::info;

/// Bind `addr` and serve `app` in a background task.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to.
pub async fn spawn_server(
    name: &'static str,
    app: Router,
    addr: SocketAddr,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("{} listening on http://{}", name, bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
                info!("{} shutting down", name);
            })
            .await
        {
            // Log error but don't crash - the bot keeps polling
            tracing::error!("{} error: {}", name, e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}
