// media/upload.rs - multipart/JSON request bodies and upload storage
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::{
    async_trait,
    extract::{multipart::Field, FromRequest, Multipart, Request},
    http::header,
    Json,
};
use chrono::Utc;
use rand::Rng;
use serde_json::{Map, Value};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::error::ApiError;

/// Upload directory on disk and the URL path it is served under.
#[derive(Debug, Clone)]
pub struct Uploads {
    dir: PathBuf,
    url_path: String,
}

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub file_name: String,
    /// Relative URL, e.g. `/uploads/photo-1700000000000-3fa2c1.jpg`.
    pub url: String,
}

impl Uploads {
    pub fn new(dir: impl Into<PathBuf>, url_path: impl Into<String>) -> Self {
        let url_path = url_path.into();
        Self {
            dir: dir.into(),
            url_path: format!("/{}", url_path.trim_matches('/')),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.upload_dir.clone(), config.url_path.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_path(&self) -> &str {
        &self.url_path
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_path, file_name)
    }

    /// Streams one multipart field to a fresh file. The client's file name
    /// only contributes its extension.
    async fn store_field(&self, prefix: &str, mut field: Field<'_>) -> Result<StoredFile, ApiError> {
        let file_name = upload_file_name(prefix, field.file_name().unwrap_or_default());
        let path = self.dir.join(&file_name);

        let mut file = File::create(&path).await.map_err(|e| {
            warn!("Cannot create upload {}: {}", path.display(), e);
            ApiError::internal_server_error("Failed to store upload")
        })?;

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(ApiError::bad_request(format!("Malformed upload: {}", e)));
                }
            };
            file.write_all(&chunk).await.map_err(|e| {
                warn!("Write to {} failed: {}", path.display(), e);
                ApiError::internal_server_error("Failed to store upload")
            })?;
        }
        file.flush().await.map_err(|e| {
            warn!("Flush of {} failed: {}", path.display(), e);
            ApiError::internal_server_error("Failed to store upload")
        })?;

        debug!("Stored upload {}", path.display());
        Ok(StoredFile {
            url: self.url_for(&file_name),
            file_name,
        })
    }
}

/// `{prefix}-{unix millis}-{random hex}{.ext}`; the extension is kept only
/// when it is plain alphanumeric.
pub fn upload_file_name(prefix: &str, original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let random: u64 = rand::thread_rng().gen::<u64>() & 0xffff_ffff_ffff;
    format!("{}-{}-{:x}{}", prefix, Utc::now().timestamp_millis(), random, ext)
}

/// A write request body: multipart form (possibly with files) or JSON.
pub enum FormBody {
    Multipart(Multipart),
    Json(Map<String, Value>),
}

#[async_trait]
impl<S> FromRequest<S> for FormBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(FormBody::Multipart(multipart));
        }

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return match value {
                Value::Object(map) => Ok(FormBody::Json(map)),
                _ => Err(ApiError::bad_request("Request body must be a JSON object")),
            };
        }

        Ok(FormBody::Json(Map::new()))
    }
}

/// Text fields and stored files of a write request.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: Map<String, Value>,
    pub files: HashMap<String, Vec<StoredFile>>,
}

impl FormData {
    /// Reads the body, storing every file part under `uploads` with
    /// `prefix`. Repeated text fields collect into an array.
    pub async fn read(body: FormBody, uploads: &Uploads, prefix: &str) -> Result<Self, ApiError> {
        let mut multipart = match body {
            FormBody::Json(fields) => {
                return Ok(Self {
                    fields,
                    files: HashMap::new(),
                })
            }
            FormBody::Multipart(multipart) => multipart,
        };

        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().trim_end_matches("[]").to_string();
            if field.file_name().is_some() {
                let stored = uploads.store_field(prefix, field).await?;
                form.files.entry(name).or_default().push(stored);
                continue;
            }

            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            match form.fields.get_mut(&name) {
                Some(Value::Array(items)) => items.push(Value::String(text)),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(text)]);
                }
                None => {
                    form.fields.insert(name, Value::String(text));
                }
            }
        }
        Ok(form)
    }

    pub fn file(&self, field: &str) -> Option<&StoredFile> {
        self.files.get(field).and_then(|f| f.first())
    }

    pub fn file_urls(&self, field: &str) -> Vec<String> {
        self.files
            .get(field)
            .map(|files| files.iter().map(|f| f.url.clone()).collect())
            .unwrap_or_default()
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Trimmed string value; numbers and booleans are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(items) => items.first().and_then(|v| v.as_str()).map(|s| s.trim().to_string()),
            _ => None,
        }
    }

    /// Accepts JSON booleans and the form strings "true"/"false"/"1"/"0"/"on".
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Some(true),
                "false" | "0" | "off" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// String list from a JSON array, a repeated form field, or a single
    /// value. Blank entries are dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        let values: Vec<&Value> = match self.fields.get(key) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(other) => vec![other],
            None => Vec::new(),
        };
        values
            .into_iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Every file this request stored, for cleanup when the write is refused.
    pub fn stored_urls(&self) -> Vec<String> {
        self.files.values().flatten().map(|f| f.url.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_name_keeps_only_a_safe_extension() {
        let name = upload_file_name("photo", "../../etc/Passwd.JPG");
        assert!(name.starts_with("photo-"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains('/'));

        let name = upload_file_name("cover", "archive.tar.g$z");
        assert!(!name.contains('.'));

        let name = upload_file_name("team", "noext");
        assert_eq!(name.split('-').count(), 3);
    }

    #[test]
    fn file_names_do_not_collide() {
        let a = upload_file_name("photo", "a.png");
        let b = upload_file_name("photo", "a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn url_path_is_normalized() {
        let uploads = Uploads::new("/tmp/x", "media/");
        assert_eq!(uploads.url_for("a.jpg"), "/media/a.jpg");
    }

    #[test]
    fn form_accessors_accept_json_and_form_shapes() {
        let form = FormData {
            fields: json!({
                "title": "  Лето ",
                "isActive": "false",
                "photos": ["/uploads/a.jpg", " ", "/uploads/b.jpg"],
                "age": 9
            })
            .as_object()
            .cloned()
            .unwrap(),
            files: HashMap::new(),
        };
        assert_eq!(form.text("title").as_deref(), Some("Лето"));
        assert_eq!(form.flag("isActive"), Some(false));
        assert_eq!(form.list("photos"), vec!["/uploads/a.jpg", "/uploads/b.jpg"]);
        assert_eq!(form.text("age").as_deref(), Some("9"));
        assert!(form.text("missing").is_none());
    }
}
