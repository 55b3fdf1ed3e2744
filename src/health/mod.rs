//! Liveness responder for the hosting platform.
//!
//!   GET /        → static HTML status page
//!   GET /health  → "OK"

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

const STATUS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>LP Burn Monitor</title></head>
<body>
<h1>Solana LP Burn Monitor ✅</h1>
<p>Status: Running</p>
<p>Monitor: Raydium LP Burns</p>
<p>Notifications: Telegram</p>
</body>
</html>"#;

pub fn build_router() -> Router {
    Router::new()
        .route("/", get(status_page))
        .route("/health", get(health))
}

/// Bind `0.0.0.0:port` and serve until the task is dropped.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    serve_on(listener).await
}

pub async fn serve_on(listener: TcpListener) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "health responder listening");
    axum::serve(listener, build_router()).await?;
    Ok(())
}

async fn status_page() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
