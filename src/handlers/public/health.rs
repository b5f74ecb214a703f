// handlers/public/health.rs - GET /health
use axum::response::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

pub async fn health_get() -> Json<Value> {
    Json(json!({
        "ok": true,
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
