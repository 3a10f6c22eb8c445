//! Image cache API routes.
//!
//! Upload, listing, metadata, raw serving, derived previews and deletion.
//! Every handler hands its store call to the blocking pool because the store
//! does synchronous file I/O and CPU-bound resizing.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, put},
    Json, Router,
};
use imgcache_store::{ImageEntry, ImageId, ImageStore, StoredImage};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use super::AppContext;

/// Content-addressed payloads never change under the same id.
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Create image-related routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/list", get(list_images))
        .route("/metadata/{id}", get(get_metadata))
        .route("/img/src/{id}", get(get_source))
        .route("/img/thumbnail/{id}", get(get_thumbnail))
        .route("/img/tn/{id}", get(get_thumbnail))
        .route("/img/background/{id}", get(get_background))
        .route("/img/delete/{id}", get(delete_image))
        .route("/push", put(push_image))
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Subfolder of the cache root.
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    /// Base64-encoded image bytes.
    pub encimg: String,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub done: &'static str,
    pub id: ImageId,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub id: ImageId,
    pub mime: String,
    pub size: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// PUT /push
async fn push_image(
    State(ctx): State<AppContext>,
    Json(req): Json<PushRequest>,
) -> Result<Json<PushResponse>, AppError> {
    let id = with_store(&ctx, move |store| store.push_encoded(&req.encimg)).await?;
    Ok(Json(PushResponse { done: "ok", id }))
}

/// GET /list?group=<name>
async fn list_images(
    State(ctx): State<AppContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ImageEntry>>, AppError> {
    let entries = with_store(&ctx, move |store| store.list(query.group.as_deref())).await?;
    Ok(Json(entries))
}

/// GET /metadata/{id}
async fn get_metadata(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<MetadataResponse>, AppError> {
    let id = ImageId::parse(&id)?;
    let image = with_store(&ctx, move |store| store.open(&id)).await?;
    Ok(Json(MetadataResponse {
        size: image.bytes.len(),
        id: image.id,
        mime: image.mime,
    }))
}

/// GET /img/src/{id}
async fn get_source(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = ImageId::parse(&id)?;
    let image = with_store(&ctx, move |store| store.open(&id)).await?;
    Ok(image_response(image))
}

/// GET /img/thumbnail/{id}
async fn get_thumbnail(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = ImageId::parse(&id)?;
    let preset = ctx.config.previews.thumbnail;
    let image = with_store(&ctx, move |store| store.render(&id, &preset)).await?;
    Ok(image_response(image))
}

/// GET /img/background/{id}
async fn get_background(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = ImageId::parse(&id)?;
    let preset = ctx.config.previews.background;
    let image = with_store(&ctx, move |store| store.render(&id, &preset)).await?;
    Ok(image_response(image))
}

/// GET /img/delete/{id}
///
/// Redirects back to the listing on success.
async fn delete_image(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let id = ImageId::parse(&id)?;
    with_store(&ctx, move |store| store.delete(&id)).await?;
    Ok(Redirect::to("/list"))
}

// ============================================================================
// Helpers
// ============================================================================

/// Run a store operation on the blocking pool.
async fn with_store<T, F>(ctx: &AppContext, op: F) -> Result<T, AppError>
where
    F: FnOnce(&ImageStore) -> imgcache_store::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = ctx.store.clone();
    let result = tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|e| imgcache_store::Error::Internal(format!("store task failed: {e}")))?;
    Ok(result?)
}

fn image_response(image: StoredImage) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.mime),
            (header::CACHE_CONTROL, IMMUTABLE.to_string()),
        ],
        image.bytes,
    )
        .into_response()
}
