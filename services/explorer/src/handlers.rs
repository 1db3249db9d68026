//! HTTP handlers for the explorer dashboard.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Extension, Path as UrlPath},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use explorer_common::error::ensure_plain_file_name;
use explorer_common::{ExplorerError, ExplorerResult};
use tracing::{debug, error, info, warn};

use crate::catalog;
use crate::pages;
use crate::state::AppState;

/// GET /all - Home page listing every dataset date
pub async fn home_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let dates = match catalog::list_dates(&state.config.kmeans_inputs_dir()).await {
        Ok(dates) => dates,
        Err(e) => {
            warn!(error = %e, "Could not list dataset dates");
            Vec::new()
        }
    };

    Html(pages::render_home(&dates)).into_response()
}

/// GET /plotz/:imagename - Rendered plot image, once the script produced it
pub async fn plot_image_handler(
    Extension(state): Extension<Arc<AppState>>,
    UrlPath(image_name): UrlPath<String>,
) -> Response {
    match read_named_file(&state.config.plots_dir(), &image_name).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) if e.is_not_found() => {
            info!(image = %image_name, "not ready");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => error_response(e),
    }
}

/// GET /get-plot/:dateid[/:classesnum] - Accepts plot requests; plots are
/// produced by the dispatcher from the k-means outputs.
pub async fn get_plot_handler(uri: Uri) -> &'static str {
    debug!(path = %uri.path(), "Plot requested");
    "ok"
}

/// GET /file/:filename - Raw cropped GeoTIFF bytes
pub async fn raster_file_handler(
    Extension(state): Extension<Arc<AppState>>,
    UrlPath(filename): UrlPath<String>,
) -> Response {
    info!(file = %filename, "Raster requested");

    let bytes = match read_named_file(&state.config.cropped_dir, &filename).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(file = %filename, error = %e, "Raster not available");
            return error_response(e);
        }
    };

    match raster_dimensions(&bytes) {
        Some((width, height)) => {
            debug!(file = %filename, width, height, size = bytes.len(), "Serving raster")
        }
        None => warn!(file = %filename, size = bytes.len(), "Could not read raster header"),
    }

    ([(header::CONTENT_TYPE, "image/tiff")], bytes).into_response()
}

/// GET /health - Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "explorer"
    }))
}

/// Fallback for cache paths that are directories: an HTML listing.
pub async fn directory_index_handler(cache_dir: Arc<PathBuf>, uri: Uri) -> Response {
    let Some(relative) = safe_relative_path(uri.path()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let dir = cache_dir.join(&relative);
    if !tokio::fs::metadata(&dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        return StatusCode::NOT_FOUND.into_response();
    }

    let mut entries = Vec::new();
    match catalog::list_file_names(&dir).await {
        Ok(names) => {
            for name in names {
                let is_dir = tokio::fs::metadata(dir.join(&name))
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false);
                entries.push((name, is_dir));
            }
        }
        Err(e) => return error_response(e),
    }
    entries.sort();

    Html(pages::render_directory_index(uri.path(), &entries)).into_response()
}

/// Width and height from the raster header, when the format is readable.
pub fn raster_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

async fn read_named_file(dir: &Path, name: &str) -> ExplorerResult<Vec<u8>> {
    let name = ensure_plain_file_name(name)?;
    let path = dir.join(name);
    tokio::fs::read(&path)
        .await
        .map_err(|e| ExplorerError::io(&path, e))
}

/// URL path as a relative filesystem path, refusing anything that walks up.
fn safe_relative_path(url_path: &str) -> Option<PathBuf> {
    let trimmed = url_path.trim_start_matches('/');
    let path = Path::new(trimmed);
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(out)
}

fn error_response(e: ExplorerError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "Request failed");
    }
    status.into_response()
}
