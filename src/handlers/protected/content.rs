// handlers/protected/content.rs - CMS writes
use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::database::models::content::{default_home, mirror_about_experience, strip_reserved_keys, HOME_SLUG};
use crate::error::ApiError;
use crate::handlers::public::content::render;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// PUT /api/content/:slug - merges the payload's top-level sections into
/// the document, creating it when absent
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let slug = slug.trim().to_string();
    if slug.is_empty() {
        return Err(ApiError::bad_request("Slug is required"));
    }

    let mut data = strip_reserved_keys(body);
    // A payload without either section leaves the stored pair untouched.
    if slug == HOME_SLUG && (data.contains_key("about") || data.contains_key("experience")) {
        data = mirror_about_experience(data);
    }

    if slug == HOME_SLUG {
        state.store.insert_content_if_absent(HOME_SLUG, default_home()).await?;
    }

    let sections: Vec<String> = data.keys().cloned().collect();
    let content = state.store.upsert_content(&slug, data).await?;
    info!("{} updated content '{}' ({})", user.email, slug, sections.join(", "));

    Ok(Json(render(content)))
}

/// PUT /api/content/contacts - replaces the home page's contacts section
pub async fn contacts_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    if !body.is_object() {
        return Err(ApiError::bad_request("Contacts must be an object"));
    }

    let mut data = Map::new();
    data.insert("contacts".to_string(), body);
    state.store.insert_content_if_absent(HOME_SLUG, default_home()).await?;
    state.store.upsert_content(HOME_SLUG, data).await?;
    info!("{} updated contacts", user.email);

    Ok(Json(json!({ "success": true })))
}
