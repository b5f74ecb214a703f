use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;

use crate::auth::{CaptchaVerifier, LoginThrottle};
use crate::config::AppConfig;
use crate::database::Store;
use crate::media::{MediaCleaner, Uploads};
use crate::middleware::RateLimiter;
use crate::supervisor::RestartHandle;

/// Shared handles every request can reach.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub throttle: LoginThrottle,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub uploads: Uploads,
    pub cleaner: MediaCleaner,
    pub limiter: Arc<RateLimiter>,
    pub restart: RestartHandle,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn Store>,
        throttle: LoginThrottle,
        captcha: Arc<dyn CaptchaVerifier>,
        restart: RestartHandle,
    ) -> Self {
        let uploads = Uploads::from_config(&config.media);
        let cleaner = MediaCleaner::new(store.clone(), uploads.clone());
        let limiter = Arc::new(RateLimiter::new(
            config.api.rate_limit_requests,
            Duration::from_millis(config.api.rate_limit_window_ms),
        ));

        Self {
            config,
            store,
            throttle,
            captcha,
            uploads,
            cleaner,
            limiter,
            restart,
        }
    }
}

impl FromRef<AppState> for RestartHandle {
    fn from_ref(state: &AppState) -> Self {
        state.restart.clone()
    }
}
