// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/*
// Middleware: JWT validation, then a role allow-list per route group
//
// Handlers that touch media release replaced or orphaned uploads through
// `MediaCleaner` only after the record change has been saved.

pub mod bookings; // list, edit, archive/restore, export
pub mod content; // CMS writes
pub mod gallery; // albums and their photos
pub mod shifts; // shifts and shift images
pub mod team; // team members
pub mod users; // accounts and roles

use crate::config::MediaConfig;
use crate::error::ApiError;
use crate::handlers::present::stored_url;
use crate::media::{normalize_media_path, FormData};
use crate::state::AppState;

/// Drops files a refused write already stored, then hands back the error.
pub(crate) async fn discard_uploads(state: &AppState, form: &FormData, err: ApiError) -> ApiError {
    let stored = form.stored_urls();
    if !stored.is_empty() {
        state.cleaner.delete_if_unused(stored).await;
    }
    err
}

/// New value for a media field: an uploaded file wins over a URL field;
/// `None` when the request carries neither.
pub(crate) fn incoming_media(form: &FormData, file_field: &str, url_field: &str, media: &MediaConfig) -> Option<String> {
    let raw = match form.file(file_field) {
        Some(file) => file.url.clone(),
        None => form.text(url_field).filter(|url| !url.is_empty())?,
    };
    Some(stored_url(&raw, media))
}

/// The previous media URL when an update pointed the field somewhere else.
pub(crate) fn replaced(previous: &str, current: &str) -> Option<String> {
    let changed = !previous.is_empty() && normalize_media_path(previous) != normalize_media_path(current);
    changed.then(|| previous.to_string())
}
