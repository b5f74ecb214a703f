// handlers/validate.rs - request field validation shared by handlers
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::models::{BookingFilter, BookingStatus, Gender, PaymentType, Transfer, UnknownVariant};
use crate::error::ApiError;

/// Russian mobile numbers: +79XXXXXXXXX or 89XXXXXXXXX.
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+7|8)9\d{9}$").expect("invalid phone pattern"));

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email pattern"));

pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Collects per-field messages; empty means valid.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(self.0))
        }
    }
}

/// Typed reads over a JSON object body that record a field error instead
/// of failing fast, so one response lists every problem.
pub struct Fields<'a> {
    body: &'a Map<String, Value>,
    pub errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub fn new(body: &'a Map<String, Value>) -> Self {
        Self {
            body,
            errors: FieldErrors::new(),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.body.get(key).filter(|v| !v.is_null())
    }

    pub fn finish(self) -> Result<(), ApiError> {
        self.errors.into_result()
    }

    /// Required non-blank string, trimmed.
    pub fn required(&mut self, key: &str) -> String {
        match self.raw(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::String(_)) | None => {
                self.errors.add(key, "Required");
                String::new()
            }
            Some(_) => {
                self.errors.add(key, "Must be a string");
                String::new()
            }
        }
    }

    /// Optional string; absent or null reads as empty.
    pub fn optional(&mut self, key: &str) -> String {
        match self.raw(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            None => String::new(),
            Some(_) => {
                self.errors.add(key, "Must be a string");
                String::new()
            }
        }
    }

    pub fn email(&mut self, key: &str) -> String {
        let value = self.required(key);
        if !value.is_empty() && !is_email(&value) {
            self.errors.add(key, "Invalid email");
        }
        value
    }

    pub fn phone(&mut self, key: &str, required: bool) -> String {
        let value = if required { self.required(key) } else { self.optional(key) };
        if !value.is_empty() && !is_phone(&value) {
            self.errors.add(key, "Phone must look like +79XXXXXXXXX or 89XXXXXXXXX");
        }
        value
    }

    /// Integer (JSON number or numeric string) within `min..=max`.
    pub fn int_in(&mut self, key: &str, min: i64, max: i64) -> i64 {
        let parsed = match self.raw(key) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if (min..=max).contains(&n) => n,
            _ => {
                self.errors.add(key, format!("Must be an integer from {} to {}", min, max));
                0
            }
        }
    }

    /// A calendar date: `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn date(&mut self, key: &str) -> Option<NaiveDate> {
        let value = self.required(key);
        if value.is_empty() {
            return None;
        }
        let parsed = parse_date(&value);
        if parsed.is_none() {
            self.errors.add(key, "Invalid date");
        }
        parsed
    }

    /// One of an enum's wire values; `default` applies when absent or blank.
    pub fn one_of<T>(&mut self, key: &str, default: Option<T>) -> Option<T>
    where
        T: FromStr<Err = UnknownVariant>,
    {
        let raw = match self.raw(key) {
            Some(Value::String(s)) if s.trim().is_empty() => None,
            other => other,
        };
        match raw {
            None => {
                if default.is_none() {
                    self.errors.add(key, "Required");
                }
                default
            }
            Some(Value::String(s)) => match s.trim().parse() {
                Ok(v) => Some(v),
                Err(e) => {
                    self.errors.add(key, e.to_string());
                    None
                }
            },
            Some(_) => {
                self.errors.add(key, "Must be a string");
                None
            }
        }
    }

    /// Partial update of an enum field: keeps `current` when absent.
    pub fn patch_enum<T>(&mut self, key: &str, current: T) -> T
    where
        T: FromStr<Err = UnknownVariant> + Copy,
    {
        self.one_of(key, Some(current)).unwrap_or(current)
    }

    /// Partial update of a text field: `None` when the key is absent.
    pub fn patch_text(&mut self, key: &str) -> Option<String> {
        self.raw(key)?;
        Some(self.optional(key))
    }

    /// Optional boolean; `Some` only when the body carries a JSON bool.
    pub fn bool_opt(&mut self, key: &str) -> Option<bool> {
        match self.raw(key) {
            Some(Value::Bool(b)) => Some(*b),
            None => None,
            Some(_) => {
                self.errors.add(key, "Must be a boolean");
                None
            }
        }
    }
}

/// Record ids arrive as path segments; anything that is not a UUID cannot
/// name a record.
pub fn record_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found(format!("{} not found", what)))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.with_timezone(&Utc).date_naive()))
}

/// Inclusive lower bound: midnight UTC of the given day, or the exact instant.
pub fn range_start(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)))
}

/// Inclusive upper bound: 23:59:59.999 UTC of the given day.
pub fn range_end(value: &str) -> Option<DateTime<Utc>> {
    let day = parse_date(value)?;
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    Some(Utc.from_utc_datetime(&day.and_time(end)))
}

/// Query string of the booking list and export routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub status: Option<String>,
    pub shift_id: Option<String>,
    pub q: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub format: Option<String>,
    pub token: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BookingQuery {
    pub fn filter(&self, limit: i64) -> Result<BookingFilter, ApiError> {
        let mut errors = FieldErrors::new();

        let status = match present(&self.status) {
            None => BookingStatus::Active,
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownVariant| {
                errors.add("status", e.to_string());
                BookingStatus::Active
            }),
        };

        let shift_id = present(&self.shift_id).and_then(|raw| match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("shiftId", "Invalid shift id");
                None
            }
        });

        let mut bound = |key: &str, raw: Option<&str>, parse: fn(&str) -> Option<DateTime<Utc>>| {
            raw.and_then(|value| {
                let parsed = parse(value);
                if parsed.is_none() {
                    errors.add(key, "Invalid date");
                }
                parsed
            })
        };
        let created_from = bound("from", present(&self.from), range_start);
        let created_to = bound("to", present(&self.to), range_end);

        errors.into_result()?;
        Ok(BookingFilter {
            status,
            shift_id,
            search: present(&self.q).map(str::to_string),
            created_from,
            created_to,
            limit,
        })
    }
}

/// Validated booking form shared by public submission and staff edits.
#[derive(Debug, Clone)]
pub struct BookingInput {
    pub email: String,
    pub shift_id: Option<String>,
    pub shift_title: String,
    pub child_full_name: String,
    pub dob: NaiveDate,
    pub age: i32,
    pub gender: Gender,
    pub parent_full_name: String,
    pub parent_phone: String,
    pub parent2_full_name: String,
    pub parent2_phone: String,
    pub address: String,
    pub roommates: String,
    pub district: String,
    pub payment_type: PaymentType,
    pub allergies: String,
    pub transfer: Transfer,
}

/// Reads the common booking fields, leaving errors in `fields.errors`.
/// `None` when any field was invalid.
pub fn booking_input(fields: &mut Fields<'_>) -> Option<BookingInput> {
    let email = fields.email("email");
    let shift_id = Some(fields.optional("shiftId")).filter(|s| !s.is_empty());
    let shift_title = fields.optional("shiftTitle");
    let child_full_name = fields.required("childFullName");
    let dob = fields.date("dob");
    let age = fields.int_in("age", 1, 21) as i32;
    let gender = fields.one_of::<Gender>("gender", None);
    let parent_full_name = fields.required("parentFullName");
    let parent_phone = fields.phone("parentPhone", true);
    let parent2_full_name = fields.optional("parent2FullName");
    let parent2_phone = fields.phone("parent2Phone", false);
    let address = fields.required("address");
    let roommates = fields.required("roommates");
    let district = fields.required("district");
    let payment_type = fields.one_of("paymentType", Some(PaymentType::Certificate));
    let allergies = fields.required("allergies");
    let transfer = fields.one_of::<Transfer>("transfer", None);

    if !fields.errors.is_empty() {
        return None;
    }

    Some(BookingInput {
        email,
        shift_id,
        shift_title,
        child_full_name,
        dob: dob?,
        age,
        gender: gender?,
        parent_full_name,
        parent_phone,
        parent2_full_name,
        parent2_phone,
        address,
        roommates,
        district,
        payment_type: payment_type?,
        allergies,
        transfer: transfer?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Fit, Position};
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn valid() -> Value {
        json!({
            "email": "parent@mail.ru",
            "shiftTitle": "Зимняя смена",
            "childFullName": "Иванов Пётр",
            "dob": "2015-05-01",
            "age": 10,
            "gender": "М",
            "parentFullName": "Иванова Анна",
            "parentPhone": "+79991234567",
            "address": "Томск",
            "roommates": "нет",
            "district": "Советский",
            "allergies": "нет",
            "transfer": "Нет",
            "agree": true
        })
    }

    #[test]
    fn phone_pattern() {
        assert!(is_phone("+79991234567"));
        assert!(is_phone("89991234567"));
        assert!(!is_phone("+78991234567"));
        assert!(!is_phone("9991234567"));
        assert!(!is_phone("+7999123456"));
    }

    #[test]
    fn valid_booking_defaults_payment_type() {
        let data = body(valid());
        let mut fields = Fields::new(&data);
        let input = booking_input(&mut fields).unwrap();
        assert_eq!(input.payment_type, PaymentType::Certificate);
        assert_eq!(input.age, 10);
        assert!(input.shift_id.is_none());
        assert!(fields.errors.is_empty());
    }

    #[test]
    fn invalid_booking_reports_each_field() {
        let mut raw = valid();
        raw["parentPhone"] = json!("12345");
        raw["age"] = json!(22);
        raw["gender"] = json!("X");
        raw["dob"] = json!("01.05.2015");
        let data = body(raw);
        let mut fields = Fields::new(&data);
        assert!(booking_input(&mut fields).is_none());

        let err = fields.errors.into_result().unwrap_err();
        let json = err.to_json();
        for key in ["parentPhone", "age", "gender", "dob"] {
            assert!(json["field_errors"].get(key).is_some(), "missing {}", key);
        }
        assert!(json["field_errors"].get("email").is_none());
    }

    #[test]
    fn blank_enum_falls_back_to_default() {
        let data = body(json!({ "imageFit": "", "imagePosition": "top center" }));
        let mut fields = Fields::new(&data);
        assert_eq!(fields.patch_enum("imageFit", Fit::Cover), Fit::Cover);
        assert_eq!(fields.patch_enum("imagePosition", Position::CenterCenter), Position::TopCenter);
        assert!(fields.finish().is_ok());
    }

    #[test]
    fn booking_query_builds_filter() {
        let query = BookingQuery {
            status: Some("archived".into()),
            q: Some("  иванов ".into()),
            from: Some("2026-01-01".into()),
            ..Default::default()
        };
        let filter = query.filter(500).unwrap();
        assert_eq!(filter.status, BookingStatus::Archived);
        assert_eq!(filter.search.as_deref(), Some("иванов"));
        assert!(filter.created_from.is_some());
        assert!(filter.created_to.is_none());

        let bad = BookingQuery {
            status: Some("deleted".into()),
            shift_id: Some("nope".into()),
            ..Default::default()
        };
        assert_eq!(bad.filter(500).unwrap_err().status_code(), 422);
    }

    #[test]
    fn non_uuid_id_is_not_found() {
        assert_eq!(record_id("abc", "Album").unwrap_err().status_code(), 404);
        assert!(record_id(&Uuid::new_v4().to_string(), "Album").is_ok());
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let start = range_start("2026-01-02").unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-02T00:00:00+00:00");

        let end = range_end("2026-01-02").unwrap();
        assert_eq!(end.timestamp_subsec_millis(), 999);
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());

        assert!(range_start("yesterday").is_none());
    }
}
