// handlers/public/shifts.rs - GET /api/shifts
use axum::{extract::State, response::Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::handlers::present;
use crate::media::MediaHost;
use crate::state::AppState;

/// GET /api/shifts - every shift, newest first
pub async fn list(State(state): State<AppState>, host: MediaHost) -> Result<Json<Value>, ApiError> {
    let shifts = state.store.list_shifts().await?;
    Ok(Json(Value::Array(
        shifts.iter().map(|s| present::shift(s, &host)).collect(),
    )))
}
