// redact.rs - personal data masking for read-only staff
use serde_json::Value;

use crate::database::models::Role;

pub fn mask_email(email: &str) -> String {
    let chars: Vec<char> = email.chars().collect();
    match chars.iter().position(|c| *c == '@') {
        Some(at) if at > 1 => {
            let head: String = chars[..2].iter().collect();
            let domain: String = chars[at..].iter().collect();
            format!("{}***{}", head, domain)
        }
        _ => "***".to_string(),
    }
}

pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 6 {
        return "****".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}****{}", head, tail)
}

fn mask_booking(booking: &mut Value) {
    let Some(obj) = booking.as_object_mut() else {
        return;
    };
    let text = |v: Option<&Value>| v.and_then(Value::as_str).unwrap_or_default().to_string();

    let email = mask_email(&text(obj.get("email")));
    let phone = mask_phone(&text(obj.get("parentPhone")));
    let phone2 = mask_phone(&text(obj.get("parent2Phone")));

    obj.insert("email".into(), Value::String(email));
    obj.insert("parentPhone".into(), Value::String(phone));
    obj.insert("parent2Phone".into(), Value::String(phone2));
    obj.insert("address".into(), Value::String("***".into()));
}

/// Masks booking payloads: an array of bookings, `{items: [...]}`, or a
/// single booking (an object with `id` and `email`). Other shapes pass
/// through untouched.
pub fn redact_bookings(mut payload: Value) -> Value {
    let single = match &mut payload {
        Value::Array(items) => {
            items.iter_mut().for_each(mask_booking);
            false
        }
        Value::Object(obj) if matches!(obj.get("items"), Some(Value::Array(_))) => {
            if let Some(Value::Array(items)) = obj.get_mut("items") {
                items.iter_mut().for_each(mask_booking);
            }
            false
        }
        Value::Object(obj) => obj.contains_key("id") && obj.contains_key("email"),
        _ => false,
    };
    if single {
        mask_booking(&mut payload);
    }
    payload
}

/// Viewers get masked bookings; every other role sees them as stored.
pub fn shape_bookings_for(role: Role, payload: Value) -> Value {
    match role {
        Role::Viewer => redact_bookings(payload),
        _ => payload,
    }
}
