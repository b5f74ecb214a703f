// handlers/protected/gallery.rs - album and photo management
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;

use super::{discard_uploads, incoming_media, replaced};
use crate::database::models::GalleryAlbum;
use crate::error::ApiError;
use crate::handlers::present::{self, stored_url};
use crate::handlers::public::gallery::ALBUM_NOT_FOUND;
use crate::handlers::validate::{record_id, Fields};
use crate::media::{normalize_media_path, FormBody, FormData, MediaHost};
use crate::state::AppState;

const COVER_PREFIX: &str = "gallery-cover";
const PHOTO_PREFIX: &str = "gallery-photo";

/// Files accepted by one photo upload request.
pub const MAX_PHOTOS_PER_UPLOAD: usize = 10;

fn apply_fields(fields: &mut Fields<'_>, album: &mut GalleryAlbum) {
    if let Some(title) = fields.patch_text("title") {
        if title.is_empty() {
            fields.errors.add("title", "Required");
        }
        album.title = title;
    }
    if let Some(description) = fields.patch_text("description") {
        album.description = description;
    }
    album.cover_fit = fields.patch_enum("coverFit", album.cover_fit);
    album.cover_position = fields.patch_enum("coverPosition", album.cover_position);
}

/// POST /api/gallery - multipart `cover` or JSON `coverUrl`
pub async fn create(
    State(state): State<AppState>,
    host: MediaHost,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, COVER_PREFIX).await?;

    let mut album = GalleryAlbum::new(String::new());
    let mut fields = Fields::new(&form.fields);
    if fields.raw("title").is_none() {
        fields.errors.add("title", "Required");
    }
    apply_fields(&mut fields, &mut album);
    if let Err(e) = fields.finish() {
        return Err(discard_uploads(&state, &form, e).await);
    }
    if let Some(url) = incoming_media(&form, "cover", "coverUrl", &state.config.media) {
        album.cover_url = url;
    }

    if let Err(e) = state.store.insert_album(&album).await {
        return Err(discard_uploads(&state, &form, e.into()).await);
    }
    info!("Album {} created: {}", album.id, album.title);
    Ok(Json(present::album(&album, &host)))
}

/// PATCH /api/gallery/:id - a replaced cover is released once saved
pub async fn update(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, COVER_PREFIX).await?;

    let found = match record_id(&id, "Album") {
        Ok(id) => state.store.find_album(id).await?,
        Err(e) => return Err(discard_uploads(&state, &form, e).await),
    };
    let Some(mut album) = found else {
        return Err(discard_uploads(&state, &form, ApiError::not_found(ALBUM_NOT_FOUND)).await);
    };
    let previous_cover = album.cover_url.clone();

    let mut fields = Fields::new(&form.fields);
    apply_fields(&mut fields, &mut album);
    if let Err(e) = fields.finish() {
        return Err(discard_uploads(&state, &form, e).await);
    }
    if let Some(url) = incoming_media(&form, "cover", "coverUrl", &state.config.media) {
        album.cover_url = url;
    }
    album.updated_at = Utc::now();

    match state.store.save_album(&album).await {
        Ok(true) => {}
        Ok(false) => return Err(discard_uploads(&state, &form, ApiError::not_found(ALBUM_NOT_FOUND)).await),
        Err(e) => return Err(discard_uploads(&state, &form, e.into()).await),
    }

    if let Some(old) = replaced(&previous_cover, &album.cover_url) {
        state.cleaner.delete_if_unused([old]).await;
    }
    Ok(Json(present::album(&album, &host)))
}

/// DELETE /api/gallery/:id - releases the cover and every photo
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "Album")?;
    let album = state
        .store
        .delete_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))?;

    let removed = state.cleaner.delete_if_unused(album.media_urls()).await;
    info!("Album {} deleted ({} files released)", album.id, removed);
    Ok(Json(json!({ "success": true })))
}

/// POST /api/gallery/:id/photos - multipart `photos` (at most 10 files)
/// and/or a `photos` list of URLs, appended in that order
pub async fn add_photos(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, PHOTO_PREFIX).await?;

    let uploaded = form.file_urls("photos");
    if uploaded.len() > MAX_PHOTOS_PER_UPLOAD {
        let err = ApiError::bad_request(format!("At most {} photos per upload", MAX_PHOTOS_PER_UPLOAD));
        return Err(discard_uploads(&state, &form, err).await);
    }

    let found = match record_id(&id, "Album") {
        Ok(id) => state.store.find_album(id).await?,
        Err(e) => return Err(discard_uploads(&state, &form, e).await),
    };
    let Some(mut album) = found else {
        return Err(discard_uploads(&state, &form, ApiError::not_found(ALBUM_NOT_FOUND)).await);
    };

    let media = &state.config.media;
    album
        .photos
        .extend(uploaded.iter().chain(form.list("photos").iter()).map(|url| stored_url(url, media)));
    album.updated_at = Utc::now();

    match state.store.save_album(&album).await {
        Ok(true) => {}
        Ok(false) => return Err(discard_uploads(&state, &form, ApiError::not_found(ALBUM_NOT_FOUND)).await),
        Err(e) => return Err(discard_uploads(&state, &form, e.into()).await),
    }
    Ok(Json(present::album(&album, &host)))
}

/// DELETE /api/gallery/:id/photos - body `{ "photoUrl": "..." }`
///
/// Every entry with the same media path is removed; the file goes once no
/// other record uses it.
pub async fn remove_photo(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "Album")?;
    let mut album = state
        .store
        .find_album(id)
        .await?
        .ok_or_else(|| ApiError::not_found(ALBUM_NOT_FOUND))?;

    let photo_url = body
        .as_ref()
        .and_then(|Json(b)| b.get("photoUrl"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::bad_request("Photo URL is required"))?;

    let target = normalize_media_path(photo_url);
    let (removed, kept): (Vec<String>, Vec<String>) = album
        .photos
        .drain(..)
        .partition(|p| normalize_media_path(p) == target);
    if removed.is_empty() {
        return Err(ApiError::not_found("Photo not found in album"));
    }
    album.photos = kept;
    album.updated_at = Utc::now();

    if !state.store.save_album(&album).await? {
        return Err(ApiError::not_found(ALBUM_NOT_FOUND));
    }
    state.cleaner.delete_if_unused(removed).await;
    Ok(Json(present::album(&album, &host)))
}
