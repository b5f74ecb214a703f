mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, DELETE_SECRET};
use novator_api::database::models::Role;

#[tokio::test]
async fn admin_creates_users_once_per_email() -> Result<()> {
    let app = TestApp::new();
    let admin = app.token_for(Role::Admin).await;
    let payload = json!({ "email": "Editor@Novator.ru", "password": "secret1", "role": "editor" });

    let (status, body) = app.json(Method::POST, "/api/users", Some(&admin), payload.clone()).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", body);
    assert_eq!(body["email"], "editor@novator.ru");
    assert!(body.get("passwordHash").is_none());

    let (status, body) = app.json(Method::POST, "/api/users", Some(&admin), payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already exists");

    let (_, list) = app.get("/api/users", Some(&admin)).await;
    let users = list.as_array().cloned().unwrap_or_default();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
    Ok(())
}

#[tokio::test]
async fn role_change_takes_effect() -> Result<()> {
    let app = TestApp::new();
    let admin = app.token_for(Role::Admin).await;
    let (user, _) = app.user("viewer@novator.ru", "secret1", Role::Viewer).await;

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("/api/users/{}/role", user.id),
            Some(&admin),
            json!({ "role": "manager" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "manager");

    let (status, _) = app
        .json(
            Method::PATCH,
            &format!("/api/users/{}/role", user.id),
            Some(&admin),
            json!({ "role": "owner" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn users_reset_only_their_own_password() -> Result<()> {
    let app = TestApp::new();
    let (me, my_token) = app.user("me@novator.ru", "secret1", Role::Editor).await;
    let (other, _) = app.user("other@novator.ru", "secret1", Role::Editor).await;

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/users/{}/reset-password", other.id),
            Some(&my_token),
            json!({ "oldPassword": "secret1", "password": "brandnew" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .json(
            Method::POST,
            &format!("/api/users/{}/reset-password", me.id),
            Some(&my_token),
            json!({ "oldPassword": "wrong", "password": "brandnew" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Старый пароль неверен");

    let (status, _) = app
        .json(
            Method::POST,
            &format!("/api/users/{}/reset-password", me.id),
            Some(&my_token),
            json!({ "oldPassword": "secret1", "password": "brandnew" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({ "email": "me@novator.ru", "password": "brandnew" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn deletion_needs_the_shared_secret() -> Result<()> {
    let app = TestApp::new();
    let admin = app.token_for(Role::Admin).await;
    let (user, _) = app.user("gone@novator.ru", "secret1", Role::Viewer).await;
    let uri = format!("/api/users/{}", user.id);

    let (status, body) = app
        .json(Method::DELETE, &uri, Some(&admin), json!({ "secret": "guess" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Неверный секрет");

    let (status, body) = app
        .json(Method::DELETE, &uri, Some(&admin), json!({ "secret": DELETE_SECRET }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) = app
        .json(Method::DELETE, &uri, Some(&admin), json!({ "secret": DELETE_SECRET }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
