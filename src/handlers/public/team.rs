// handlers/public/team.rs - GET /api/team
use axum::{extract::State, response::Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::present;
use crate::media::MediaHost;
use crate::state::AppState;

/// GET /api/team - members in the order they were added
pub async fn list(State(state): State<AppState>, host: MediaHost) -> Result<Json<Value>, ApiError> {
    let members = state.store.list_team().await?;
    Ok(Json(Value::Array(
        members.iter().map(|m| present::member(m, &host)).collect(),
    )))
}
