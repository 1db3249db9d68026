//! Router assembly and the HTTP server loop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::Extension, http::Uri, routing::get, Router};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::handlers;
use crate::socket;
use crate::state::AppState;

/// Build the dashboard router.
///
/// Unmatched paths fall through to `static/`, then to the cache
/// directory, then to a listing of cache directories.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cache_dir = Arc::new(state.config.cache_dir.clone());
    let directory_index = get(move |uri: Uri| {
        let cache_dir: Arc<PathBuf> = cache_dir.clone();
        async move { handlers::directory_index_handler(cache_dir, uri).await }
    });

    let files = ServeDir::new(&state.config.static_dir)
        .fallback(ServeDir::new(&state.config.cache_dir).fallback(directory_index));

    Router::new()
        .route("/all", get(handlers::home_handler))
        .route("/plotz/:imagename", get(handlers::plot_image_handler))
        .route("/get-plot/:dateid", get(handlers::get_plot_handler))
        .route("/get-plot/:dateid/:classesnum", get(handlers::get_plot_handler))
        .route("/file/:filename", get(handlers::raster_file_handler))
        .route("/socket", get(socket::socket_handler))
        .route("/health", get(handlers::health_handler))
        .fallback_service(files)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve until a shutdown signal arrives.
pub async fn run_server(
    state: Arc<AppState>,
    addr: SocketAddr,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "listening at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.recv().await.ok();
        })
        .await?;

    Ok(())
}
