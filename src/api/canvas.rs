//! Canvas lookup endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use uuid::Uuid;

use super::auth::AuthUser;
use super::error::ApiError;
use super::routes::AppState;
use super::types::CanvasList;
use crate::canvas_store::Canvas;

const LIST_LIMIT: usize = 50;

fn not_found() -> ApiError {
    ApiError::NotFound("Canvas not found".to_string())
}

fn storage_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Canvas storage error: {}", e);
    ApiError::Internal("Error loading canvas".to_string())
}

/// `GET /api/admin/canvases`
pub async fn list_canvases(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CanvasList>, ApiError> {
    let canvases = state
        .canvases
        .list_canvases(&user.id, LIST_LIMIT)
        .await
        .map_err(storage_error)?;
    Ok(Json(CanvasList { canvases }))
}

/// `GET /api/admin/canvases/:id` - only the owner can see a canvas.
pub async fn get_canvas(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Canvas>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let canvas = state
        .canvases
        .get_canvas(id)
        .await
        .map_err(storage_error)?
        .filter(|c| c.owner_id == user.id)
        .ok_or_else(not_found)?;
    Ok(Json(canvas))
}
