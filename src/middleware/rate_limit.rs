use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use super::client::client_addr;
use crate::error::ApiError;
use crate::state::AppState;

/// Fixed-window request counter per client address.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a request; false once the address is over its limit for the
    /// current window.
    pub fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Drop stale windows so the map does not grow without bound.
        if windows.len() > 10_000 {
            let window = self.window;
            windows.retain(|_, (start, _)| now.duration_since(*start) < window);
        }

        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 <= self.limit
    }
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    let key = client_addr(request.headers(), request.extensions(), state.config.server.trust_proxy);
    if !state.limiter.allow(&key) {
        tracing::warn!("Rate limit exceeded for {}", key);
        return Err(ApiError::too_many_requests("Too many requests, please try again later"));
    }
    Ok(next.run(request).await)
}
