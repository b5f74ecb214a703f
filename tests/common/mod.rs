#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use novator_api::auth::{generate_jwt, hash_password, CaptchaOutcome, CaptchaVerifier, Claims, LoginThrottle};
use novator_api::config::AppConfig;
use novator_api::database::models::{Role, User};
use novator_api::database::{MemoryStore, Store, UserStore};
use novator_api::routes;
use novator_api::state::AppState;
use novator_api::supervisor::RestartHandle;

pub const JWT_SECRET: &str = "test-secret";
pub const DELETE_SECRET: &str = "delete-me";

/// Captcha provider stand-in with a fixed verdict.
pub struct FixedCaptcha(pub CaptchaOutcome);

#[async_trait]
impl CaptchaVerifier for FixedCaptcha {
    async fn verify(&self, _token: &str, _remote_ip: Option<&str>) -> CaptchaOutcome {
        self.0
    }
}

/// One app instance over an in-memory store and a private upload dir.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub restart: RestartHandle,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Extra `KEY=value` settings layered over the test defaults.
    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        Self::with_captcha(extra, CaptchaOutcome::Passed)
    }

    /// Like `with_env`, with every captcha check answering `outcome`.
    pub fn with_captcha(extra: &[(&str, &str)], outcome: CaptchaOutcome) -> Self {
        let upload_dir = std::env::temp_dir().join(format!("novator-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&upload_dir).expect("create upload dir");

        let mut env: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgres://unused".to_string()),
            ("JWT_SECRET".to_string(), JWT_SECRET.to_string()),
            ("ADMIN_DELETE_SECRET".to_string(), DELETE_SECRET.to_string()),
            ("UPLOAD_DIR".to_string(), upload_dir.display().to_string()),
            ("RATE_LIMIT_MAX".to_string(), "10000".to_string()),
        ]);
        for (key, value) in extra {
            env.insert(key.to_string(), value.to_string());
        }
        let config = AppConfig::from_lookup(|key| env.get(key).cloned()).expect("test config");

        let store = Arc::new(MemoryStore::new());
        let restart = RestartHandle::new(Duration::from_secs(60));
        let state = AppState::new(
            Arc::new(config),
            store.clone() as Arc<dyn Store>,
            LoginThrottle::in_memory(3, chrono::Duration::minutes(15)),
            Arc::new(FixedCaptcha(outcome)),
            restart.clone(),
        );

        Self {
            router: routes::app(state),
            store,
            restart,
            upload_dir,
        }
    }

    /// Stores a user and returns it with a valid bearer token.
    pub async fn user(&self, email: &str, password: &str, role: Role) -> (User, String) {
        let hash = hash_password(password).await.expect("hash");
        let user = User::new(email, hash, role);
        self.store.insert_user(&user).await.expect("insert user");
        let token = generate_jwt(&Claims::new(&user, 1), JWT_SECRET).expect("token");
        (user, token)
    }

    pub async fn token_for(&self, role: Role) -> String {
        let email = format!("{}-{}@novator.ru", role, uuid::Uuid::new_v4().simple());
        self.user(&email, "password1", role).await.1
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn send_raw(&self, mut request: Request<Body>) -> (StatusCode, Vec<u8>) {
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))));
        let response = self.router.clone().oneshot(request).await.expect("router");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(method, uri, token, Some(body))).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// A booking form payload that passes validation.
pub fn booking_form() -> Value {
    serde_json::json!({
        "email": "parent@example.com",
        "shiftTitle": "Лето 2026",
        "childFullName": "Иванов Иван",
        "dob": "2014-05-01",
        "age": 11,
        "gender": "М",
        "parentFullName": "Иванова Анна",
        "parentPhone": "+79991234567",
        "address": "Москва, ул. Ленина, 1",
        "roommates": "нет",
        "district": "Центральный",
        "allergies": "нет",
        "transfer": "Да",
        "agree": true
    })
}
