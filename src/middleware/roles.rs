use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::database::models::Role;
use crate::error::ApiError;

/// Booking and catalogue management.
pub const STAFF: &[Role] = &[Role::Admin, Role::Manager];
/// Booking list access; viewers see masked data.
pub const BOOKING_READERS: &[Role] = &[Role::Admin, Role::Manager, Role::Viewer];
/// Site text editing.
pub const CONTENT_EDITORS: &[Role] = &[Role::Admin, Role::Manager, Role::Editor];
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const ANY_ROLE: &[Role] = Role::ALL;

/// Role guard. Mount after `jwt_auth_middleware`:
///
/// ```ignore
/// .route_layer(from_fn(|req: Request, next: Next| require_roles(STAFF, req, next)))
/// ```
pub async fn require_roles(allowed: &'static [Role], request: Request, next: Next) -> Result<Response, ApiError> {
    let role = request
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.role)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !allowed.contains(&role) {
        return Err(ApiError::forbidden("Insufficient permissions"));
    }

    Ok(next.run(request).await)
}
