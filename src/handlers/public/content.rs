// handlers/public/content.rs - GET /api/content/:slug, GET /api/content/contacts
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::content::{default_home, mirror_about_experience, HOME_SLUG};
use crate::database::models::Content;
use crate::error::ApiError;
use crate::state::AppState;

pub const CONTENT_NOT_FOUND: &str = "Content not found";

/// Reads a content document. The home page is created with starter
/// content the first time anyone asks for it.
pub(crate) async fn load(state: &AppState, slug: &str) -> Result<Option<Content>, ApiError> {
    if let Some(content) = state.store.find_content(slug).await? {
        return Ok(Some(content));
    }
    if slug != HOME_SLUG {
        return Ok(None);
    }

    if state.store.insert_content_if_absent(HOME_SLUG, default_home()).await? {
        info!("Created default home content");
    }
    Ok(state.store.find_content(HOME_SLUG).await?)
}

/// Wire shape of a document; home always shows `about` and `experience`
/// as the same section.
pub(crate) fn render(mut content: Content) -> Value {
    if content.slug == HOME_SLUG {
        content.data = mirror_about_experience(content.data);
    }
    json!(content)
}

/// GET /api/content/:slug
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<Value>, ApiError> {
    let content = load(&state, &slug)
        .await?
        .ok_or_else(|| ApiError::not_found(CONTENT_NOT_FOUND))?;
    Ok(Json(render(content)))
}

/// GET /api/content/contacts - the contacts section of the home page
pub async fn contacts_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let home = load(&state, HOME_SLUG)
        .await?
        .ok_or_else(|| ApiError::not_found(CONTENT_NOT_FOUND))?;
    let contacts = home.data.get("contacts").cloned().unwrap_or(Value::Null);
    Ok(Json(json!({ "contacts": contacts })))
}
