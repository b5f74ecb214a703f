// handlers/public/config.rs - GET /api/config/public
use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Settings the public site needs before a user logs in.
pub async fn public_get(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "hcaptchaSiteKey": state.config.captcha.site_key,
        "hcaptchaRequired": state.config.captcha.required,
    }))
}
