use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Fit, Position};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub description: String,
    pub photo_url: String,
    pub photo_fit: Fit,
    pub photo_position: Position,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position: String::new(),
            description: String::new(),
            photo_url: String::new(),
            photo_fit: Fit::Cover,
            photo_position: Position::CenterCenter,
            created_at: now,
            updated_at: now,
        }
    }
}
