use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
    pub captcha: CaptchaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Browser origins allowed by CORS. Empty means "mirror any origin".
    pub cors_origins: Vec<String>,
    pub restart_delay_ms: u64,
    pub max_json_bytes: usize,
    /// Take the client address from `X-Forwarded-For` instead of the socket.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub ping_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub rate_limit_requests: u32,
    pub rate_limit_window_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub admin_delete_secret: Option<String>,
    pub login_max_attempts: u32,
    pub login_lockout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory uploaded files are written to.
    pub upload_dir: PathBuf,
    /// URL path the upload directory is served under, e.g. "/uploads".
    pub url_path: String,
    /// Public origin used for absolute media URLs (MEDIA_HOST or API_URL).
    pub media_host: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    pub site_key: String,
    pub secret: Option<String>,
    pub required: bool,
    pub verify_url: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        // Set defaults based on environment, then override with specific env vars
        let base = match environment {
            Environment::Production => Self::production(database_url, jwt_secret),
            Environment::Staging => Self::staging(database_url, jwt_secret),
            Environment::Development => Self::development(database_url, jwt_secret),
        };

        Ok(base.with_overrides(&get))
    }

    fn with_overrides(mut self, get: &dyn Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = get("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        let origins: Vec<String> = ["FRONTEND_URL", "ADMIN_URL"]
            .iter()
            .filter_map(|key| get(key))
            .map(|v| v.trim_end_matches('/').to_string())
            .collect();
        if !origins.is_empty() {
            self.server.cors_origins = origins;
        }
        if let Some(v) = get("TRUST_PROXY") {
            self.server.trust_proxy = parse_flag(&v);
        }
        if let Some(v) = get("RESTART_DELAY_MS") {
            self.server.restart_delay_ms = v.parse().unwrap_or(self.server.restart_delay_ms);
        }

        // Database overrides
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = get("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = get("DB_PING_INTERVAL_SECS") {
            self.database.ping_interval_secs = v.parse().unwrap_or(self.database.ping_interval_secs);
        }

        // API overrides
        if let Some(v) = get("RATE_LIMIT_MAX") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Some(v) = get("RATE_LIMIT_WINDOW_MS") {
            self.api.rate_limit_window_ms = v.parse().unwrap_or(self.api.rate_limit_window_ms);
        }

        // Security overrides
        if let Some(v) = get("JWT_EXPIRY_HOURS") {
            match v.parse::<u64>() {
                Ok(hours) if (1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) => self.security.jwt_expiry_hours = hours,
                _ => tracing::warn!(
                    "JWT_EXPIRY_HOURS must be 1..={}; keeping {}",
                    MAX_JWT_EXPIRY_HOURS,
                    self.security.jwt_expiry_hours
                ),
            }
        }
        self.security.admin_delete_secret = get("ADMIN_DELETE_SECRET");

        // Media overrides
        if let Some(v) = get("UPLOAD_DIR") {
            self.media.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = get("UPLOAD_URL_PATH") {
            self.media.url_path = format!("/{}", v.trim_matches('/'));
        }
        self.media.media_host = get("MEDIA_HOST").or_else(|| get("API_URL"));

        // Captcha overrides
        if let Some(v) = get("HCAPTCHA_SITE_KEY").or_else(|| get("HCAPTCHA_SITEKEY")) {
            self.captcha.site_key = v;
        }
        self.captcha.secret = get("HCAPTCHA_SECRET").or_else(|| get("HCAPTCHA_KEY"));
        if let Some(v) = get("HCAPTCHA_REQUIRED") {
            self.captcha.required = parse_flag(&v);
        }
        if get("HCAPTCHA_BYPASS").as_deref().map(parse_flag).unwrap_or(false) {
            self.captcha.required = false;
        }
        if self.captcha.required && self.captcha.secret.is_none() {
            tracing::warn!("HCAPTCHA_REQUIRED is set but no HCAPTCHA_SECRET configured; captcha disabled");
            self.captcha.required = false;
        }

        self
    }

    fn development(database_url: String, jwt_secret: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 4000,
                cors_origins: Vec::new(),
                restart_delay_ms: 5000,
                max_json_bytes: 5 * 1024 * 1024, // 5MB
                trust_proxy: false,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
                connection_timeout: 30,
                ping_interval_secs: 30,
            },
            api: ApiConfig {
                rate_limit_requests: 120,
                rate_limit_window_ms: 60_000,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
                admin_delete_secret: None,
                login_max_attempts: 3,
                login_lockout_secs: 15 * 60,
            },
            media: MediaConfig {
                upload_dir: PathBuf::from("uploads"),
                url_path: "/uploads".to_string(),
                media_host: None,
            },
            captcha: CaptchaConfig {
                site_key: String::new(),
                secret: None,
                required: false,
                verify_url: "https://hcaptcha.com/siteverify".to_string(),
                timeout_secs: 5,
            },
        }
    }

    fn staging(database_url: String, jwt_secret: String) -> Self {
        let mut config = Self::development(database_url, jwt_secret);
        config.environment = Environment::Staging;
        config.database.max_connections = 10;
        config.database.connection_timeout = 10;
        config
    }

    fn production(database_url: String, jwt_secret: String) -> Self {
        let mut config = Self::development(database_url, jwt_secret);
        config.environment = Environment::Production;
        config.database.max_connections = 20;
        config.database.connection_timeout = 5;
        config.database.ping_interval_secs = 15;
        config
    }
}

impl DatabaseConfig {
    /// Database settings alone, for tools that never issue tokens.
    pub fn from_env() -> Result<Self, ConfigError> {
        let get = |key: &str| env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        Ok(AppConfig::development(url, String::new()).with_overrides(&get).database)
    }
}

/// Token lifetime bounds: one week by default, ten years at most.
pub const DEFAULT_JWT_EXPIRY_HOURS: u64 = 24 * 7;
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
