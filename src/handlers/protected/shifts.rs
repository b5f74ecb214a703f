// handlers/protected/shifts.rs - shift management
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{discard_uploads, incoming_media, replaced};
use crate::database::models::Shift;
use crate::error::ApiError;
use crate::handlers::present;
use crate::handlers::validate::{record_id, Fields};
use crate::media::{FormBody, FormData, MediaHost};
use crate::state::AppState;

const UPLOAD_PREFIX: &str = "shift";
const SHIFT_NOT_FOUND: &str = "Not found";

/// Title, dates, price, description, flags and display options present in
/// the request. The image is handled by the caller.
fn apply_fields(fields: &mut Fields<'_>, form: &FormData, shift: &mut Shift) {
    if let Some(title) = fields.patch_text("title") {
        if title.is_empty() {
            fields.errors.add("title", "Required");
        }
        shift.title = title;
    }
    if let Some(dates) = fields.patch_text("dates") {
        shift.dates = dates;
    }
    if let Some(price) = fields.patch_text("price") {
        shift.price = price;
    }
    if let Some(description) = fields.patch_text("description") {
        shift.description = description;
    }
    shift.image_fit = fields.patch_enum("imageFit", shift.image_fit);
    shift.image_position = fields.patch_enum("imagePosition", shift.image_position);
    if let Some(active) = form.flag("isActive") {
        shift.is_active = active;
    }
}

/// POST /api/shifts
pub async fn create(
    State(state): State<AppState>,
    host: MediaHost,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, UPLOAD_PREFIX).await?;

    let mut shift = Shift::new(String::new());
    let mut fields = Fields::new(&form.fields);
    if fields.raw("title").is_none() {
        fields.errors.add("title", "Required");
    }
    apply_fields(&mut fields, &form, &mut shift);
    if let Err(e) = fields.finish() {
        return Err(discard_uploads(&state, &form, e).await);
    }
    if let Some(url) = incoming_media(&form, "image", "imageUrl", &state.config.media) {
        shift.image_url = url;
    }

    if let Err(e) = state.store.insert_shift(&shift).await {
        return Err(discard_uploads(&state, &form, e.into()).await);
    }
    info!("Shift {} created: {}", shift.id, shift.title);
    Ok(Json(present::shift(&shift, &host)))
}

/// PATCH /api/shifts/:id
pub async fn update(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, UPLOAD_PREFIX).await?;
    save_changes(&state, &host, &id, form, true).await
}

/// POST /api/shifts/:id/image - multipart `image`, optional fit/position
pub async fn upload_image(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, UPLOAD_PREFIX).await?;
    save_changes(&state, &host, &id, form, false).await
}

async fn save_changes(
    state: &AppState,
    host: &MediaHost,
    id: &str,
    form: FormData,
    all_fields: bool,
) -> Result<Json<Value>, ApiError> {
    let found = match record_id(id, "Shift") {
        Ok(id) => state.store.find_shift(id).await?,
        Err(e) => return Err(discard_uploads(state, &form, e).await),
    };
    let Some(mut shift) = found else {
        return Err(discard_uploads(state, &form, ApiError::not_found(SHIFT_NOT_FOUND)).await);
    };
    let previous_image = shift.image_url.clone();

    let mut fields = Fields::new(&form.fields);
    if all_fields {
        apply_fields(&mut fields, &form, &mut shift);
    } else {
        shift.image_fit = fields.patch_enum("imageFit", shift.image_fit);
        shift.image_position = fields.patch_enum("imagePosition", shift.image_position);
    }
    if let Err(e) = fields.finish() {
        return Err(discard_uploads(state, &form, e).await);
    }
    if let Some(url) = incoming_media(&form, "image", "imageUrl", &state.config.media) {
        shift.image_url = url;
    }
    shift.updated_at = Utc::now();

    match state.store.save_shift(&shift).await {
        Ok(true) => {}
        Ok(false) => return Err(discard_uploads(state, &form, ApiError::not_found(SHIFT_NOT_FOUND)).await),
        Err(e) => return Err(discard_uploads(state, &form, e.into()).await),
    }

    if let Some(old) = replaced(&previous_image, &shift.image_url) {
        state.cleaner.delete_if_unused([old]).await;
    }
    Ok(Json(present::shift(&shift, host)))
}

/// DELETE /api/shifts/:id - bookings keep their title snapshot
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "Shift")?;
    let shift = state
        .store
        .delete_shift(id)
        .await?
        .ok_or_else(|| ApiError::not_found(SHIFT_NOT_FOUND))?;

    state.cleaner.delete_if_unused([shift.image_url.as_str()]).await;
    info!("Shift {} deleted", shift.id);
    Ok(Json(json!({ "ok": true })))
}
