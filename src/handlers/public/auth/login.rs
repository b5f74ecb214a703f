// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, response::Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::throttle::minutes_left;
use crate::auth::{generate_jwt, verify_password, CaptchaOutcome, Claims};
use crate::database::models::user::normalize_email;
use crate::error::ApiError;
use crate::middleware::ClientAddr;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub captcha_token: Option<String>,
}

const INVALID_CREDENTIALS: &str = "Неверные данные";

/**
 * POST /auth/login - Authenticate an admin-panel user and receive a JWT
 *
 * Expected Input:
 * ```json
 * { "email": "admin@novator.ru", "password": "secret", "captchaToken": "..." }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * { "token": "eyJhbGciOiJIUzI1NiI...", "user": { "email": "admin@novator.ru", "role": "admin" } }
 * ```
 *
 * A locked client address gets 429 before the database is consulted.
 * Unknown email and wrong password are indistinguishable (401) and both
 * count toward the lockout.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.unwrap_or_default();
    let now = Utc::now();

    if let Err(remaining) = state.throttle.check(&client, now) {
        warn!("Login refused for locked client {}", client);
        return Err(ApiError::too_many_requests(format!(
            "Слишком много попыток. Повторите через {} мин",
            minutes_left(remaining)
        )));
    }

    if state.config.captcha.required {
        let token = request
            .captcha_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::bad_request("Подтвердите, что вы не робот"))?;

        let outcome = state.captcha.verify(token, Some(&client)).await;
        if outcome == CaptchaOutcome::Unavailable {
            warn!("Captcha provider unavailable; allowing login attempt from {}", client);
        }
        if !outcome.allows_login() {
            return Err(ApiError::bad_request("Подтвердите, что вы не робот"));
        }
    }

    let email = request.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = request.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email и пароль обязательны"));
    }

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) if verify_password(&password, &user.password_hash).await? => user,
        _ => {
            if state.throttle.record_failure(&client, now) {
                warn!("Client {} locked out after repeated login failures", client);
            }
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    state.throttle.reset(&client);

    let claims = Claims::new(&user, state.config.security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &state.config.security.jwt_secret)?;
    info!("User {} logged in ({})", user.email, user.role);

    Ok(Json(json!({
        "token": token,
        "user": {
            "email": user.email,
            "role": user.role,
        }
    })))
}
