// handlers/public/gallery.rs - GET /api/gallery, GET /api/gallery/:id
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::present;
use crate::handlers::validate::record_id;
use crate::media::MediaHost;
use crate::state::AppState;

pub const ALBUM_NOT_FOUND: &str = "Album not found";

/// GET /api/gallery - albums, newest first
pub async fn list(State(state): State<AppState>, host: MediaHost) -> Result<Json<Value>, ApiError> {
    let albums = state.store.list_albums().await?;
    Ok(Json(Value::Array(
        albums.iter().map(|a| present::album(a, &host)).collect(),
    )))
}

/// GET /api/gallery/:id
pub async fn show(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "Album")?;
    let album = state
        .store
        .find_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))?;
    Ok(Json(present::album(&album, &host)))
}
