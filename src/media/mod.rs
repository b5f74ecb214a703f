// media/mod.rs - media URL handling shared by gallery, team and shift routes
pub mod cleanup;
pub mod upload;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;

use crate::state::AppState;

pub use cleanup::MediaCleaner;
pub use upload::{FormBody, FormData, StoredFile, Uploads};

/// Strips a trailing `/` and then a trailing `/api` from a configured host.
pub fn clean_host(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}

fn is_absolute(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Makes a stored media reference absolute.
///
/// Empty stays empty, backslashes become slashes and `http(s)://` URLs pass
/// through. Anything else gets a leading slash and, when a host is known,
/// the host in front. Applying it twice gives the same result.
pub fn to_absolute_url(raw: &str, host: Option<&str>) -> String {
    let cleaned = raw.trim().replace('\\', "/");
    if cleaned.is_empty() || is_absolute(&cleaned) {
        return cleaned;
    }

    let host = host.filter(|h| !h.is_empty());
    if let Some(h) = host {
        if cleaned.starts_with(&format!("{}/", h)) {
            return cleaned;
        }
    }

    let with_slash = if cleaned.starts_with('/') {
        cleaned
    } else {
        format!("/{}", cleaned)
    };

    match host {
        Some(h) => format!("{}{}", h, with_slash),
        None => with_slash,
    }
}

pub fn to_absolute_urls(raw: &[String], host: Option<&str>) -> Vec<String> {
    raw.iter().map(|u| to_absolute_url(u, host)).collect()
}

/// Path component of a media URL, absolute or relative, without query
/// string or trailing slash. Used to match uploads on disk and in records.
pub fn normalize_media_path(raw: &str) -> String {
    let cleaned = raw.trim().replace('\\', "/");
    let cleaned = cleaned.split('?').next().unwrap_or_default();
    if cleaned.is_empty() {
        return String::new();
    }

    let parsed = url::Url::parse("http://placeholder").and_then(|base| base.join(cleaned));
    let path = match parsed {
        Ok(url) => url.path().to_string(),
        Err(_) => {
            let without_scheme = if is_absolute(cleaned) {
                cleaned.splitn(2, "://").nth(1).unwrap_or_default()
            } else {
                cleaned
            };
            if without_scheme.starts_with('/') {
                without_scheme.to_string()
            } else {
                format!("/{}", without_scheme)
            }
        }
    };

    path.strip_suffix('/').unwrap_or(&path).to_string()
}

/// Origin of the current request as seen by the client, honoring proxies.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    let first = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let proto = first("x-forwarded-proto").unwrap_or_else(|| "http".to_string());
    let host = first("x-forwarded-host").or_else(|| first(header::HOST.as_str()))?;
    Some(format!("{}://{}", proto, host))
}

/// Host used to absolutize media URLs in a response: the configured media
/// host when there is one, else the request origin.
#[derive(Debug, Clone, Default)]
pub struct MediaHost(pub Option<String>);

impl MediaHost {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn absolute(&self, raw: &str) -> String {
        to_absolute_url(raw, self.as_deref())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MediaHost {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let configured = state.config.media.media_host.as_deref().map(clean_host);
        Ok(MediaHost(configured.or_else(|| request_origin(&parts.headers))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn clean_host_strips_api_suffix() {
        assert_eq!(clean_host("https://api.novator.ru/api/"), "https://api.novator.ru");
        assert_eq!(clean_host("https://novator.ru/"), "https://novator.ru");
        assert_eq!(clean_host("https://novator.ru"), "https://novator.ru");
    }

    #[test]
    fn absolutizes_relative_paths() {
        let host = Some("https://api.novator.ru");
        assert_eq!(to_absolute_url("", host), "");
        assert_eq!(to_absolute_url("uploads\\a.jpg", host), "https://api.novator.ru/uploads/a.jpg");
        assert_eq!(to_absolute_url(" /uploads/a.jpg ", None), "/uploads/a.jpg");
        assert_eq!(to_absolute_url("HTTPS://cdn.example/a.jpg", host), "HTTPS://cdn.example/a.jpg");
    }

    #[test]
    fn absolutizing_is_idempotent() {
        for host in [None, Some("https://api.novator.ru"), Some("api.novator.ru")] {
            for raw in ["", "a.jpg", "/uploads/b.png", "uploads\\c.gif", "http://x/y.jpg"] {
                let once = to_absolute_url(raw, host);
                assert_eq!(to_absolute_url(&once, host), once, "{:?} {:?}", raw, host);
            }
        }
    }

    #[test]
    fn media_path_drops_host_query_and_trailing_slash() {
        assert_eq!(normalize_media_path("https://api.x/uploads/a.jpg?v=2"), "/uploads/a.jpg");
        assert_eq!(normalize_media_path("uploads/a.jpg/"), "/uploads/a.jpg");
        assert_eq!(normalize_media_path("\\uploads\\b.png"), "/uploads/b.png");
        assert_eq!(normalize_media_path(""), "");
    }

    #[test]
    fn origin_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:4000"));
        assert_eq!(request_origin(&headers).as_deref(), Some("http://internal:4000"));

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("novator.ru"));
        assert_eq!(request_origin(&headers).as_deref(), Some("https://novator.ru"));

        assert_eq!(request_origin(&HeaderMap::new()), None);
    }
}
