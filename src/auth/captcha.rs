use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::config::CaptchaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptchaOutcome {
    Passed,
    /// The provider answered and refused the token.
    Rejected,
    /// The provider could not be reached in time.
    Unavailable,
}

impl CaptchaOutcome {
    /// Login proceeds unless the provider explicitly refused.
    pub fn allows_login(self) -> bool {
        !matches!(self, CaptchaOutcome::Rejected)
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> CaptchaOutcome;
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// hCaptcha `siteverify` client.
pub struct HCaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl HCaptchaVerifier {
    pub fn new(config: &CaptchaConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            secret: config.secret.clone().unwrap_or_default(),
            verify_url: config.verify_url.clone(),
        })
    }
}

#[async_trait]
impl CaptchaVerifier for HCaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> CaptchaOutcome {
        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = match self.client.post(&self.verify_url).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Captcha provider unreachable, allowing login: {}", e);
                return CaptchaOutcome::Unavailable;
            }
        };

        match response.json::<SiteVerifyResponse>().await {
            Ok(body) if body.success => CaptchaOutcome::Passed,
            Ok(body) => {
                warn!("Captcha rejected: {:?}", body.error_codes);
                CaptchaOutcome::Rejected
            }
            Err(e) => {
                warn!("Captcha provider returned an unreadable answer, allowing login: {}", e);
                CaptchaOutcome::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rejection_blocks_login() {
        assert!(CaptchaOutcome::Passed.allows_login());
        assert!(CaptchaOutcome::Unavailable.allows_login());
        assert!(!CaptchaOutcome::Rejected.allows_login());
    }

    #[tokio::test]
    async fn unreachable_provider_fails_open() {
        let config = CaptchaConfig {
            site_key: String::new(),
            secret: Some("0x0".into()),
            required: true,
            verify_url: "http://127.0.0.1:9/siteverify".into(),
            timeout_secs: 1,
        };
        let verifier = HCaptchaVerifier::new(&config).unwrap();
        assert_eq!(verifier.verify("token", None).await, CaptchaOutcome::Unavailable);
    }

    #[test]
    fn parses_provider_answer() {
        let body: SiteVerifyResponse =
            serde_json::from_str(r#"{"success":false,"error-codes":["invalid-input-response"]}"#).unwrap();
        assert!(!body.success);
        assert_eq!(body.error_codes, vec!["invalid-input-response"]);
    }
}
