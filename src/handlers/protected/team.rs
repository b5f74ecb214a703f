// handlers/protected/team.rs - team member management
use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{discard_uploads, incoming_media, replaced};
use crate::database::models::TeamMember;
use crate::error::ApiError;
use crate::handlers::present;
use crate::handlers::validate::{record_id, Fields};
use crate::media::{FormBody, FormData, MediaHost};
use crate::state::AppState;

const UPLOAD_PREFIX: &str = "team";
const MEMBER_NOT_FOUND: &str = "Team member not found";

fn apply_fields(fields: &mut Fields<'_>, member: &mut TeamMember) {
    if let Some(name) = fields.patch_text("name") {
        if name.is_empty() {
            fields.errors.add("name", "Required");
        }
        member.name = name;
    }
    if let Some(position) = fields.patch_text("position") {
        member.position = position;
    }
    if let Some(description) = fields.patch_text("description") {
        member.description = description;
    }
    member.photo_fit = fields.patch_enum("photoFit", member.photo_fit);
    member.photo_position = fields.patch_enum("photoPosition", member.photo_position);
}

/// POST /api/team - multipart `photo` or JSON `photoUrl`
pub async fn create(
    State(state): State<AppState>,
    host: MediaHost,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, UPLOAD_PREFIX).await?;

    let mut member = TeamMember::new(String::new());
    let mut fields = Fields::new(&form.fields);
    if fields.raw("name").is_none() {
        fields.errors.add("name", "Required");
    }
    apply_fields(&mut fields, &mut member);
    if let Err(e) = fields.finish() {
        return Err(discard_uploads(&state, &form, e).await);
    }
    if let Some(url) = incoming_media(&form, "photo", "photoUrl", &state.config.media) {
        member.photo_url = url;
    }

    if let Err(e) = state.store.insert_member(&member).await {
        return Err(discard_uploads(&state, &form, e.into()).await);
    }
    info!("Team member {} added: {}", member.id, member.name);
    Ok(Json(present::member(&member, &host)))
}

/// PUT|PATCH /api/team/:id - only the fields present change
pub async fn update(
    State(state): State<AppState>,
    host: MediaHost,
    Path(id): Path<String>,
    body: FormBody,
) -> Result<Json<Value>, ApiError> {
    let form = FormData::read(body, &state.uploads, UPLOAD_PREFIX).await?;

    let found = match record_id(&id, "Team member") {
        Ok(id) => state.store.find_member(id).await?,
        Err(e) => return Err(discard_uploads(&state, &form, e).await),
    };
    let Some(mut member) = found else {
        return Err(discard_uploads(&state, &form, ApiError::not_found(MEMBER_NOT_FOUND)).await);
    };
    let previous_photo = member.photo_url.clone();

    let mut fields = Fields::new(&form.fields);
    apply_fields(&mut fields, &mut member);
    if let Err(e) = fields.finish() {
        return Err(discard_uploads(&state, &form, e).await);
    }
    if let Some(url) = incoming_media(&form, "photo", "photoUrl", &state.config.media) {
        member.photo_url = url;
    }
    member.updated_at = Utc::now();

    match state.store.save_member(&member).await {
        Ok(true) => {}
        Ok(false) => return Err(discard_uploads(&state, &form, ApiError::not_found(MEMBER_NOT_FOUND)).await),
        Err(e) => return Err(discard_uploads(&state, &form, e.into()).await),
    }

    if let Some(old) = replaced(&previous_photo, &member.photo_url) {
        state.cleaner.delete_if_unused([old]).await;
    }
    Ok(Json(present::member(&member, &host)))
}

/// DELETE /api/team/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "Team member")?;
    let member = state
        .store
        .delete_member(id)
        .await?
        .ok_or_else(|| ApiError::not_found(MEMBER_NOT_FOUND))?;

    state.cleaner.delete_if_unused([member.photo_url.as_str()]).await;
    info!("Team member {} removed", member.id);
    Ok(Json(json!({ "success": true })))
}
