// handlers/protected/bookings.rs - booking review for staff
use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
    Extension,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::database::models::BookingStatus;
use crate::error::ApiError;
use crate::export::{self, ExportFormat, EXPORT_LIMIT};
use crate::handlers::present;
use crate::handlers::public::bookings::{apply_input, resolve_shift};
use crate::handlers::validate::{booking_input, record_id, BookingQuery, Fields};
use crate::middleware::AuthUser;
use crate::redact::shape_bookings_for;
use crate::state::AppState;

/// Most rows the list view returns.
pub const LIST_LIMIT: i64 = 500;

const BOOKING_NOT_FOUND: &str = "Not found";

/// GET /api/bookings - filtered list, newest first; masked for viewers
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.filter(LIST_LIMIT)?;
    let bookings = state.store.list_bookings(&filter).await?;
    Ok(Json(shape_bookings_for(user.role, json!(bookings))))
}

/// PUT /api/bookings/:id - full edit by staff
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let id = record_id(&id, "Booking")?;

    let mut fields = Fields::new(&body);
    let input = booking_input(&mut fields);
    let agree = fields.bool_opt("agree");
    let status = match fields.raw("status") {
        Some(_) => fields.one_of::<BookingStatus>("status", None),
        None => None,
    };
    fields.finish()?;
    let input = input.ok_or_else(|| ApiError::bad_request("Invalid booking"))?;

    let mut booking = state
        .store
        .find_booking(id)
        .await?
        .ok_or_else(|| ApiError::not_found(BOOKING_NOT_FOUND))?;

    let shift = resolve_shift(state.store.as_ref(), input.shift_id.as_deref()).await?;
    apply_input(&mut booking, input, shift.as_ref());
    if let Some(agree) = agree {
        booking.agree = agree;
    }
    if let Some(status) = status {
        booking.status = status;
    }
    booking.updated_at = Utc::now();

    if !state.store.save_booking(&booking).await? {
        return Err(ApiError::not_found(BOOKING_NOT_FOUND));
    }
    Ok(Json(json!(booking)))
}

async fn set_status(state: &AppState, id: &str, status: BookingStatus) -> Result<Json<Value>, ApiError> {
    let id = record_id(id, "Booking")?;
    if !state.store.set_booking_status(id, status).await? {
        return Err(ApiError::not_found(BOOKING_NOT_FOUND));
    }
    info!("Booking {} is now {}", id, status);
    Ok(Json(json!({ "ok": true })))
}

/// PATCH /api/bookings/:id/archive
pub async fn archive(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    set_status(&state, &id, BookingStatus::Archived).await
}

/// PATCH /api/bookings/:id/restore
pub async fn restore(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    set_status(&state, &id, BookingStatus::Active).await
}

/// GET /api/bookings/export?format=csv|xlsx
pub async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<BookingQuery>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::parse(query.format.as_deref());
    let filter = query.filter(EXPORT_LIMIT)?;

    let bookings = state.store.list_bookings(&filter).await?;
    let table = export::bookings_table(&bookings);
    let bytes = export::render(&table, format)?;
    info!("{} exported {} bookings as {:?}", user.email, bookings.len(), format);

    Ok(present::attachment(format, bytes))
}
