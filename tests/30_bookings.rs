mod common;

use anyhow::Result;
use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use serde_json::json;

use common::{booking_form, TestApp};
use novator_api::database::models::Role;

#[tokio::test]
async fn valid_booking_is_stored_active() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.json(Method::POST, "/api/bookings", None, booking_form()).await;
    assert_eq!(status, StatusCode::OK, "submit failed: {}", body);
    assert_eq!(body["ok"], true);

    let admin = app.token_for(Role::Admin).await;
    let (status, list) = app.get("/api/bookings", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let items = list.as_array().cloned().unwrap_or_default();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], body["id"]);
    assert_eq!(items[0]["status"], "active");
    assert_eq!(items[0]["paymentType"], "certificate");
    assert_eq!(items[0]["shiftTitle"], "Лето 2026");
    Ok(())
}

#[tokio::test]
async fn invalid_fields_are_reported_per_field() -> Result<()> {
    let app = TestApp::new();

    let mut form = booking_form();
    form["parentPhone"] = json!("12345");
    let (status, body) = app.json(Method::POST, "/api/bookings", None, form).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["parentPhone"].is_string(), "{}", body);

    let mut form = booking_form();
    form["agree"] = json!(false);
    let (status, body) = app.json(Method::POST, "/api/bookings", None, form).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["agree"].is_string(), "{}", body);

    let mut form = booking_form();
    form["age"] = json!(22);
    let (status, body) = app.json(Method::POST, "/api/bookings", None, form).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["age"].is_string(), "{}", body);
    Ok(())
}

#[tokio::test]
async fn shift_title_snapshot_survives_shift_deletion() -> Result<()> {
    let app = TestApp::new();
    let manager = app.token_for(Role::Manager).await;

    let (status, shift) = app
        .json(Method::POST, "/api/shifts", Some(&manager), json!({ "title": "Осень 2026" }))
        .await;
    assert_eq!(status, StatusCode::OK, "shift create failed: {}", shift);
    let shift_id = shift["id"].as_str().unwrap_or_default().to_string();

    let mut form = booking_form();
    form["shiftId"] = json!(shift_id);
    form["shiftTitle"] = json!("stale title from the form");
    let (status, _) = app.json(Method::POST, "/api/bookings", None, form).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(common::request(Method::DELETE, &format!("/api/shifts/{}", shift_id), Some(&manager), None))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, list) = app.get("/api/bookings", Some(&manager)).await;
    assert_eq!(list[0]["shiftTitle"], "Осень 2026");
    assert_eq!(list[0]["shiftId"], json!(shift_id));
    Ok(())
}

#[tokio::test]
async fn viewers_see_masked_personal_data() -> Result<()> {
    let app = TestApp::new();
    app.json(Method::POST, "/api/bookings", None, booking_form()).await;

    let viewer = app.token_for(Role::Viewer).await;
    let (status, list) = app.get("/api/bookings", Some(&viewer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["email"], "pa***@example.com");
    assert_eq!(list[0]["parentPhone"], "+79****67");
    assert_eq!(list[0]["address"], "***");
    assert_eq!(list[0]["childFullName"], "Иванов Иван");

    let admin = app.token_for(Role::Admin).await;
    let (_, list) = app.get("/api/bookings", Some(&admin)).await;
    assert_eq!(list[0]["email"], "parent@example.com");
    assert_eq!(list[0]["parentPhone"], "+79991234567");
    Ok(())
}

#[tokio::test]
async fn archive_and_restore_move_between_lists() -> Result<()> {
    let app = TestApp::new();
    let (_, created) = app.json(Method::POST, "/api/bookings", None, booking_form()).await;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    let manager = app.token_for(Role::Manager).await;

    let (status, body) = app
        .send(common::request(Method::PATCH, &format!("/api/bookings/{}/archive", id), Some(&manager), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, active) = app.get("/api/bookings", Some(&manager)).await;
    assert_eq!(active.as_array().map(Vec::len), Some(0));
    let (_, archived) = app.get("/api/bookings?status=archived", Some(&manager)).await;
    assert_eq!(archived.as_array().map(Vec::len), Some(1));

    app.send(common::request(Method::PATCH, &format!("/api/bookings/{}/restore", id), Some(&manager), None))
        .await;
    let (_, active) = app.get("/api/bookings", Some(&manager)).await;
    assert_eq!(active.as_array().map(Vec::len), Some(1));

    let (status, _) = app
        .send(common::request(Method::PATCH, "/api/bookings/not-a-uuid/archive", Some(&manager), None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn bad_list_filters_are_rejected() -> Result<()> {
    let app = TestApp::new();
    let admin = app.token_for(Role::Admin).await;

    let (status, _) = app.get("/api/bookings?status=deleted", Some(&admin)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app.get("/api/bookings?from=yesterday", Some(&admin)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn csv_export_is_an_attachment() -> Result<()> {
    let app = TestApp::new();
    app.json(Method::POST, "/api/bookings", None, booking_form()).await;
    let manager = app.token_for(Role::Manager).await;

    let request = Request::builder()
        .uri("/api/bookings/export?format=csv")
        .header(header::AUTHORIZATION, format!("Bearer {}", manager))
        .body(Body::empty())?;
    let (status, bytes) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes)?;
    assert!(text.contains("Иванов Иван"), "export missing booking: {}", text);
    Ok(())
}

#[tokio::test]
async fn legacy_excel_export_accepts_query_token() -> Result<()> {
    let app = TestApp::new();
    app.json(Method::POST, "/api/bookings", None, booking_form()).await;

    let (status, body) = app.get("/api/bookings/export/excel", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Нет токена");

    let (status, _) = app.get("/api/bookings/export/excel?token=garbage", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let viewer = app.token_for(Role::Viewer).await;
    let (status, _) = app
        .get(&format!("/api/bookings/export/excel?token={}", viewer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.token_for(Role::Admin).await;
    let request = Request::builder()
        .uri(format!("/api/bookings/export/excel?token={}", admin))
        .body(Body::empty())?;
    let (status, bytes) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::OK);
    // xlsx is a zip archive
    assert!(bytes.starts_with(b"PK"));
    Ok(())
}

#[tokio::test]
async fn search_matches_partial_words() -> Result<()> {
    let app = TestApp::new();
    app.json(Method::POST, "/api/bookings", None, booking_form()).await;
    let admin = app.token_for(Role::Admin).await;

    for q in ["%D0%B8%D0%B2%D0%B0", "parent", "PARENT%20example", "7999"] {
        let (status, list) = app.get(&format!("/api/bookings?q={}", q), Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().map(Vec::len), Some(1), "q={}", q);
    }

    let (_, list) = app.get("/api/bookings?q=parent%20sidorov", Some(&admin)).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
    Ok(())
}
