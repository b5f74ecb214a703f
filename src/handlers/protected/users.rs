// handlers/protected/users.rs - admin panel accounts
use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::database::models::{Role, User};
use crate::database::StoreError;
use crate::error::ApiError;
use crate::handlers::validate::{record_id, Fields};
use crate::middleware::AuthUser;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

const USER_NOT_FOUND: &str = "Not found";

fn password(fields: &mut Fields<'_>, key: &str) -> String {
    let value = fields.required(key);
    if !value.is_empty() && value.chars().count() < MIN_PASSWORD_LEN {
        fields
            .errors
            .add(key, format!("Must be at least {} characters", MIN_PASSWORD_LEN));
    }
    value
}

fn summary(user: &User) -> Value {
    json!({ "id": user.id, "email": user.email, "role": user.role })
}

/// Compares digests so the check does not depend on where the inputs differ.
fn secret_matches(given: &str, expected: &str) -> bool {
    Sha256::digest(given.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// GET /api/users - newest first, never with password hashes
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(json!(users)))
}

/// POST /api/users - `{ email, password, role }`
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let mut fields = Fields::new(&body);
    let email = fields.email("email");
    let password = password(&mut fields, "password");
    let role = fields.one_of::<Role>("role", None);
    fields.finish()?;
    let role = role.ok_or_else(|| ApiError::bad_request("Role is required"))?;

    let user = User::new(&email, hash_password(&password).await?, role);
    match state.store.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Conflict(_)) => return Err(ApiError::conflict("Email already exists")),
        Err(e) => return Err(e.into()),
    }

    info!("{} created user {} ({})", admin.email, user.email, user.role);
    Ok(Json(summary(&user)))
}

/// PATCH /api/users/:id/role - `{ role }`
pub async fn update_role(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "User")?;
    let mut fields = Fields::new(&body);
    let role = fields.one_of::<Role>("role", None);
    fields.finish()?;
    let role = role.ok_or_else(|| ApiError::bad_request("Role is required"))?;

    let user = state
        .store
        .update_user_role(id, role)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    info!("{} set role of {} to {}", admin.email, user.email, user.role);
    Ok(Json(summary(&user)))
}

/// POST /api/users/:id/reset-password - `{ oldPassword, password }`
///
/// Admins may reset anyone, other roles only themselves. The current
/// password must verify either way.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "User")?;
    let mut fields = Fields::new(&body);
    let new_password = password(&mut fields, "password");
    let old_password = fields.optional("oldPassword");
    fields.finish()?;

    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;

    if caller.role != Role::Admin && caller.id != user.id {
        return Err(ApiError::forbidden("Недостаточно прав"));
    }
    if old_password.is_empty() {
        return Err(ApiError::bad_request("Укажите старый пароль"));
    }
    if !verify_password(&old_password, &user.password_hash).await? {
        return Err(ApiError::bad_request("Старый пароль неверен"));
    }

    let hash = hash_password(&new_password).await?;
    if !state.store.update_user_password(user.id, &hash).await? {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }

    info!("{} reset the password of {}", caller.email, user.email);
    Ok(Json(json!({ "ok": true })))
}

/// DELETE /api/users/:id - body `{ secret }` must match ADMIN_DELETE_SECRET
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Option<Json<Map<String, Value>>>,
) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "User")?;
    let given = body
        .as_ref()
        .and_then(|Json(b)| b.get("secret"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let Some(expected) = state.config.security.admin_delete_secret.as_deref() else {
        warn!("User deletion refused: ADMIN_DELETE_SECRET is not configured");
        return Err(ApiError::forbidden("Неверный секрет"));
    };
    if given.is_empty() || !secret_matches(given, expected) {
        warn!("{} supplied a wrong delete secret", admin.email);
        return Err(ApiError::forbidden("Неверный секрет"));
    }

    if !state.store.delete_user(id).await? {
        return Err(ApiError::not_found(USER_NOT_FOUND));
    }

    info!("{} deleted user {}", admin.email, id);
    Ok(Json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_comparison() {
        assert!(secret_matches("s3cret", "s3cret"));
        assert!(!secret_matches("s3cret", "s3cre"));
        assert!(!secret_matches("", "s3cret"));
    }

    #[test]
    fn short_password_is_rejected() {
        let body = json!({ "password": "12345" }).as_object().cloned().unwrap();
        let mut fields = Fields::new(&body);
        password(&mut fields, "password");
        assert_eq!(fields.finish().unwrap_err().status_code(), 422);
    }
}
