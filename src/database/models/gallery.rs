use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fit, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryAlbum {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    pub cover_fit: Fit,
    pub cover_position: Position,
    /// Photo URLs in display order.
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryAlbum {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            cover_url: String::new(),
            cover_fit: Fit::Contain,
            cover_position: Position::CenterCenter,
            photos: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Every media URL the album points at: cover first, then photos.
    pub fn media_urls(&self) -> Vec<String> {
        std::iter::once(self.cover_url.clone())
            .chain(self.photos.iter().cloned())
            .filter(|url| !url.is_empty())
            .collect()
    }
}
