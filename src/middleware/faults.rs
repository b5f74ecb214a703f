use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::supervisor::RestartHandle;

/// Any 500 leaving a handler is treated as an infrastructure fault and arms
/// a restart. Expected failures (4xx, 503) pass through.
pub async fn report_faults(State(restart): State<RestartHandle>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
        restart.schedule(&format!("500 from {} {}", method, path));
    }
    response
}
