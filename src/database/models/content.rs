use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub const HOME_SLUG: &str = "home";

/// A CMS page document. Sections are loosely structured JSON kept under
/// `data`; the wire format flattens them next to the identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: Uuid,
    pub slug: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Keys owned by the store; never accepted from a client payload.
const RESERVED_KEYS: &[&str] = &["id", "_id", "slug", "createdAt", "updatedAt", "__v"];

pub fn strip_reserved_keys(mut data: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        data.remove(*key);
    }
    data
}

/// The home page shows one "about" block under two historical keys. Both are
/// kept identical: for each of title/text the first non-empty value wins,
/// "about" before "experience".
pub fn mirror_about_experience(mut data: Map<String, Value>) -> Map<String, Value> {
    let about = section(&data, "about");
    let experience = section(&data, "experience");

    let pick = |field: &str| -> Value {
        [&about, &experience]
            .iter()
            .filter_map(|s| s.get(field).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .unwrap_or_else(|| Value::String(String::new()))
    };
    let title = pick("title");
    let text = pick("text");

    let mut merged_about = about.clone();
    merged_about.insert("title".into(), title.clone());
    merged_about.insert("text".into(), text.clone());

    let mut merged_experience = experience.clone();
    merged_experience.insert("title".into(), title);
    merged_experience.insert("text".into(), text);

    data.insert("about".into(), Value::Object(merged_about));
    data.insert("experience".into(), Value::Object(merged_experience));
    data
}

fn section(data: &Map<String, Value>, key: &str) -> Map<String, Value> {
    data.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Starter home page used by seeding and by the first read of `home`.
pub fn default_home() -> Map<String, Value> {
    let about = json!({
        "title": "Наш опыт",
        "text": "С 2012 года мы создаём пространство для роста и дружбы."
    });

    let doc = json!({
        "hero": {
            "title": "Детский IT лагерь «НОВАТОР»",
            "subtitle": "Инновационный детский лагерь",
            "description": "Присоединяйтесь к нам и станьте частью нового поколения новаторов!",
            "cta": "Забронировать",
            "showRocket": true
        },
        "about": about,
        "experience": about,
        "stats": [],
        "itDirections": [],
        "bookingForm": {
            "title": "Анкета на бронирование путёвки в лагерь «Новатор»",
            "subtitle": "Выберите подходящую смену и заполните форму",
            "consentText": "Я согласен(на) на обработку персональных данных в соответствии с Федеральным законом №152-ФЗ"
        },
        "contacts": {
            "title": "Контакты",
            "phone": "",
            "email": "",
            "address": "",
            "vkUrl": "",
            "map": { "lat": 56.4846, "lng": 84.9476, "zoom": 12 }
        }
    });

    match doc {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
