// Web server
// axum routes for the chat page, chat turns and PDF uploads

pub mod errors;
pub mod handlers;
pub mod session;
pub mod validation;


use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::documents::PdfIndexer;
use crate::rag::Assistant;

pub use errors::WebError;

/// Shared by every request
pub struct AppState {
    pub assistant: Assistant,
    pub indexer: Arc<dyn PdfIndexer>,
    /// Where uploaded PDFs are saved; created on first upload
    pub upload_dir: PathBuf,
}

#[inline]
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/get", post(handlers::chat))
        .route("/upload_pdf", post(handlers::upload_pdf))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `address` and serve until Ctrl-C
#[inline]
pub async fn serve(address: &str, app: Router) -> Result<()> {
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Cooking assistant listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
