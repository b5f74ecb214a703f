// handlers/public/bookings.rs - booking form submission and legacy export
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Json, Response},
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Booking, BookingStatus, Shift};
use crate::database::{Store, StoreResult};
use crate::error::ApiError;
use crate::export::{self, ExportFormat, EXPORT_LIMIT};
use crate::handlers::present;
use crate::handlers::validate::{booking_input, BookingInput, BookingQuery, Fields};
use crate::middleware::{authenticate, extract_jwt_from_headers, STAFF};
use crate::state::AppState;

const DEFAULT_SHIFT_TITLE: &str = "Смена";

/// Looks up the shift a booking names. Unknown or malformed ids resolve to
/// `None` and the booking keeps only its title snapshot.
pub(crate) async fn resolve_shift(store: &dyn Store, shift_id: Option<&str>) -> StoreResult<Option<Shift>> {
    let Some(id) = shift_id.and_then(|raw| Uuid::parse_str(raw).ok()) else {
        return Ok(None);
    };
    store.find_shift(id).await
}

/// Copies validated form fields onto a booking. The snapshot title comes
/// from the live shift when there is one, else from the submitted title.
pub(crate) fn apply_input(booking: &mut Booking, input: BookingInput, shift: Option<&Shift>) {
    let submitted_title = input.shift_title.trim().to_string();
    booking.shift_id = shift.map(|s| s.id);
    booking.shift_title = match shift {
        Some(s) => s.title.clone(),
        None if !submitted_title.is_empty() => submitted_title,
        None if booking.shift_title.is_empty() => DEFAULT_SHIFT_TITLE.to_string(),
        None => booking.shift_title.clone(),
    };

    booking.email = input.email;
    booking.child_full_name = input.child_full_name;
    booking.dob = input.dob;
    booking.age = input.age;
    booking.gender = input.gender;
    booking.parent_full_name = input.parent_full_name;
    booking.parent_phone = input.parent_phone;
    booking.parent2_full_name = input.parent2_full_name;
    booking.parent2_phone = input.parent2_phone;
    booking.address = input.address;
    booking.roommates = input.roommates;
    booking.district = input.district;
    booking.payment_type = input.payment_type;
    booking.allergies = input.allergies;
    booking.transfer = input.transfer;
}

/// POST /api/bookings - public booking form
pub async fn submit_post(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let mut fields = Fields::new(&body);
    let input = booking_input(&mut fields);
    if fields.raw("agree") != Some(&Value::Bool(true)) {
        fields.errors.add("agree", "Consent to personal data processing is required");
    }
    fields.finish()?;
    let input = input.ok_or_else(|| ApiError::bad_request("Invalid booking"))?;

    let shift = resolve_shift(state.store.as_ref(), input.shift_id.as_deref()).await?;

    let now = Utc::now();
    let mut booking = Booking {
        id: Uuid::new_v4(),
        email: String::new(),
        shift_id: None,
        shift_title: String::new(),
        child_full_name: String::new(),
        dob: input.dob,
        age: input.age,
        gender: input.gender,
        parent_full_name: String::new(),
        parent_phone: String::new(),
        parent2_full_name: String::new(),
        parent2_phone: String::new(),
        address: String::new(),
        roommates: String::new(),
        district: String::new(),
        payment_type: input.payment_type,
        allergies: String::new(),
        transfer: input.transfer,
        agree: true,
        status: BookingStatus::Active,
        created_at: now,
        updated_at: now,
    };
    apply_input(&mut booking, input, shift.as_ref());

    state.store.insert_booking(&booking).await?;
    info!("Booking {} submitted for '{}'", booking.id, booking.shift_title);

    Ok(Json(json!({ "ok": true, "id": booking.id })))
}

/// GET /api/bookings/export/excel - spreadsheet with Russian headers
///
/// Opened directly by the browser, so the token may arrive as `?token=`
/// instead of a header.
pub async fn export_excel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BookingQuery>,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers)
        .ok()
        .or_else(|| query.token.clone().filter(|t| !t.trim().is_empty()))
        .ok_or_else(|| ApiError::unauthorized("Нет токена"))?;

    let user = authenticate(&token, &state.config.security.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Неверный токен"))?;
    if !STAFF.contains(&user.role) {
        return Err(ApiError::forbidden("Недостаточно прав"));
    }

    // Anything but "archived" exports the active list.
    let query = BookingQuery {
        status: match query.status.as_deref() {
            Some("archived") => Some("archived".to_string()),
            _ => None,
        },
        ..query
    };
    let filter = query.filter(EXPORT_LIMIT)?;

    let bookings = state.store.list_bookings(&filter).await?;
    let table = export::legacy_bookings_table(&bookings);
    let bytes = export::render(&table, ExportFormat::Xlsx)?;
    info!("{} exported {} bookings (legacy)", user.email, bookings.len());

    Ok(present::attachment(ExportFormat::Xlsx, bytes))
}
