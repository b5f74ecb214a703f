use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fit, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: Uuid,
    pub title: String,
    /// Free text, e.g. "03.01.2026 – 09.01.2026".
    pub dates: String,
    /// Free text, shown as-is.
    pub price: String,
    pub description: String,
    pub image_url: String,
    pub image_fit: Fit,
    pub image_position: Position,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shift {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            dates: String::new(),
            price: String::new(),
            description: String::new(),
            image_url: String::new(),
            image_fit: Fit::Cover,
            image_position: Position::CenterCenter,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
