use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::string_enum;

string_enum! {
    Gender {
        Male => "М",
        Female => "Ж",
    }
}

string_enum! {
    PaymentType {
        Certificate => "certificate",
        Full => "full",
    }
}

string_enum! {
    /// Whether the family needs the camp bus.
    Transfer {
        Yes => "Да",
        No => "Нет",
    }
}

string_enum! {
    BookingStatus {
        Active => "active",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub email: String,
    /// Weak reference; the shift may have been deleted since.
    pub shift_id: Option<Uuid>,
    /// Title of the shift at submission time.
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
    pub agree: bool,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking list/export criteria. All present criteria must match.
#[derive(Debug, Clone)]
pub struct BookingFilter {
    pub status: BookingStatus,
    pub shift_id: Option<Uuid>,
    /// Free-text query; every word must appear in email, names or phone.
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub limit: i64,
}

impl Default for BookingFilter {
    fn default() -> Self {
        Self {
            status: BookingStatus::Active,
            shift_id: None,
            search: None,
            created_from: None,
            created_to: None,
            limit: 500,
        }
    }
}

impl BookingFilter {
    /// Lower-cased words of the free-text query. Each one must occur as a
    /// substring of the booking's email, child name, parent name or phone.
    pub fn search_terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_lowercase).collect())
            .unwrap_or_default()
    }

    /// In-process evaluation of the filter. `PgStore` pushes one
    /// case-insensitive substring test per search term, so both stores
    /// agree on partial words.
    pub fn matches(&self, booking: &Booking) -> bool {
        if booking.status != self.status {
            return false;
        }
        if let Some(shift_id) = self.shift_id {
            if booking.shift_id != Some(shift_id) {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if booking.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if booking.created_at > to {
                return false;
            }
        }
        let terms = self.search_terms();
        if !terms.is_empty() {
            let haystack = format!(
                "{} {} {} {}",
                booking.email, booking.child_full_name, booking.parent_full_name, booking.parent_phone
            )
            .to_lowercase();
            if !terms.iter().all(|term| haystack.contains(term.as_str())) {
                return false;
            }
        }
        true
    }
}
