// handlers/present.rs - response shapes with absolute media URLs
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

use crate::config::MediaConfig;
use crate::database::models::{GalleryAlbum, Shift, TeamMember};
use crate::export::ExportFormat;
use crate::media::{clean_host, to_absolute_url, to_absolute_urls, MediaHost};

pub fn shift(shift: &Shift, host: &MediaHost) -> Value {
    let mut value = json!(shift);
    value["imageUrl"] = json!(host.absolute(&shift.image_url));
    value
}

pub fn member(member: &TeamMember, host: &MediaHost) -> Value {
    let mut value = json!(member);
    value["photoUrl"] = json!(host.absolute(&member.photo_url));
    value
}

pub fn album(album: &GalleryAlbum, host: &MediaHost) -> Value {
    let mut value = json!(album);
    value["coverUrl"] = json!(host.absolute(&album.cover_url));
    value["photos"] = json!(to_absolute_urls(&album.photos, host.as_deref()));
    value
}

/// URL as persisted: absolute against the configured media host only, so
/// stored records never capture a request's Host header.
pub fn stored_url(raw: &str, media: &MediaConfig) -> String {
    let host = media.media_host.as_deref().map(clean_host);
    to_absolute_url(raw, host.as_deref())
}

/// Spreadsheet download with the format's content type and file name.
pub fn attachment(format: ExportFormat, bytes: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", format.file_name()),
        ),
    ];
    (headers, bytes).into_response()
}
