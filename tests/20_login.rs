mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use novator_api::auth::CaptchaOutcome;
use novator_api::database::models::Role;

fn wrong_login_from(forwarded_for: &str) -> axum::http::Request<axum::body::Body> {
    let mut request = common::request(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "admin@novator.ru", "password": "nope" })),
    );
    request
        .headers_mut()
        .insert("x-forwarded-for", forwarded_for.parse().expect("header value"));
    request
}

fn captcha_env() -> [(&'static str, &'static str); 2] {
    [("HCAPTCHA_REQUIRED", "true"), ("HCAPTCHA_SECRET", "0xsecret")]
}

#[tokio::test]
async fn login_returns_token_and_role() -> Result<()> {
    let app = TestApp::new();
    app.user("admin@novator.ru", "secret1", Role::Admin).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "  Admin@Novator.ru ", "password": "secret1" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "admin@novator.ru");
    assert_eq!(body["user"]["role"], "admin");
    Ok(())
}

#[tokio::test]
async fn missing_credentials_are_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .json(Method::POST, "/api/auth/login", None, json!({ "email": "a@b.ru" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email и пароль обязательны");
    Ok(())
}

#[tokio::test]
async fn fourth_attempt_after_three_failures_is_locked() -> Result<()> {
    let app = TestApp::new();
    app.user("admin@novator.ru", "secret1", Role::Admin).await;
    let wrong = json!({ "email": "admin@novator.ru", "password": "nope" });

    for _ in 0..3 {
        let (status, body) = app.json(Method::POST, "/api/auth/login", None, wrong.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Неверные данные");
    }

    // Even the right password is refused while locked
    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "admin@novator.ru", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"].as_str().unwrap_or_default().starts_with("Слишком много попыток"));
    Ok(())
}

#[tokio::test]
async fn success_clears_earlier_failures() -> Result<()> {
    let app = TestApp::new();
    app.user("admin@novator.ru", "secret1", Role::Admin).await;
    let wrong = json!({ "email": "admin@novator.ru", "password": "nope" });
    let right = json!({ "email": "admin@novator.ru", "password": "secret1" });

    for _ in 0..2 {
        let (status, _) = app.json(Method::POST, "/api/auth/login", None, wrong.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = app.json(Method::POST, "/api/auth/login", None, right.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap_or_default().to_string();
    let (status, _) = app.get("/api/bookings", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, _) = app.json(Method::POST, "/api/auth/login", None, wrong.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = app.json(Method::POST, "/api/auth/login", None, right).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn legacy_login_path_still_works() -> Result<()> {
    let app = TestApp::new();
    app.user("manager@novator.ru", "secret1", Role::Manager).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/login",
            None,
            json!({ "email": "manager@novator.ru", "password": "secret1" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "manager");
    Ok(())
}

#[tokio::test]
async fn guarded_routes_need_a_valid_token() -> Result<()> {
    let app = TestApp::new();

    let (status, _) = app.get("/api/bookings", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/bookings", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let editor = app.token_for(Role::Editor).await;
    let (status, _) = app.get("/api/bookings", Some(&editor)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let manager = app.token_for(Role::Manager).await;
    let (status, _) = app.get("/api/users", Some(&manager)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn rotating_forwarded_header_does_not_dodge_lockout() -> Result<()> {
    let app = TestApp::new();
    app.user("admin@novator.ru", "secret1", Role::Admin).await;

    let mut statuses = Vec::new();
    for i in 0..6 {
        let (status, _) = app.send(wrong_login_from(&format!("10.9.9.{}", i))).await;
        statuses.push(status);
    }
    assert_eq!(
        statuses,
        vec![
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn trusted_proxy_keys_lockout_by_forwarded_address() -> Result<()> {
    let app = TestApp::with_env(&[("TRUST_PROXY", "true")]);
    app.user("admin@novator.ru", "secret1", Role::Admin).await;

    for _ in 0..3 {
        let (status, _) = app.send(wrong_login_from("203.0.113.7")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = app.send(wrong_login_from("203.0.113.7")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // Another client behind the same proxy is unaffected
    let (status, _) = app.send(wrong_login_from("203.0.113.8")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn required_captcha_needs_a_token() -> Result<()> {
    let app = TestApp::with_captcha(&captcha_env(), CaptchaOutcome::Passed);
    app.user("admin@novator.ru", "secret1", Role::Admin).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "admin@novator.ru", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Подтвердите, что вы не робот");

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "admin@novator.ru", "password": "secret1", "captchaToken": "tok" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn rejected_captcha_blocks_login() -> Result<()> {
    let app = TestApp::with_captcha(&captcha_env(), CaptchaOutcome::Rejected);
    app.user("admin@novator.ru", "secret1", Role::Admin).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "admin@novator.ru", "password": "secret1", "captchaToken": "tok" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Подтвердите, что вы не робот");
    Ok(())
}

#[tokio::test]
async fn unreachable_captcha_provider_fails_open() -> Result<()> {
    let app = TestApp::with_captcha(&captcha_env(), CaptchaOutcome::Unavailable);
    app.user("admin@novator.ru", "secret1", Role::Admin).await;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "admin@novator.ru", "password": "secret1", "captchaToken": "tok" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "login should proceed: {}", body);
    assert_eq!(body["user"]["role"], "admin");
    Ok(())
}
