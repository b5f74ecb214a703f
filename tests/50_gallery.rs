mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::TestApp;
use novator_api::database::models::Role;

fn touch(app: &TestApp, name: &str) {
    std::fs::write(app.upload_dir.join(name), b"jpeg").expect("write fixture");
}

fn exists(app: &TestApp, name: &str) -> bool {
    app.upload_dir.join(name).exists()
}

#[tokio::test]
async fn shared_file_outlives_one_reference() -> Result<()> {
    let app = TestApp::new();
    let manager = app.token_for(Role::Manager).await;
    touch(&app, "a.jpg");
    touch(&app, "b.jpg");

    let (status, album) = app
        .json(
            Method::POST,
            "/api/gallery",
            Some(&manager),
            json!({ "title": "Лето", "coverUrl": "/uploads/a.jpg" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", album);
    let id = album["id"].as_str().unwrap_or_default().to_string();

    let (status, album) = app
        .json(
            Method::POST,
            &format!("/api/gallery/{}/photos", id),
            Some(&manager),
            json!({ "photos": ["/uploads/a.jpg", "/uploads/b.jpg"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(album["photos"].as_array().map(Vec::len), Some(2));

    // a.jpg is still the cover
    let (status, _) = app
        .json(
            Method::DELETE,
            &format!("/api/gallery/{}/photos", id),
            Some(&manager),
            json!({ "photoUrl": "/uploads/a.jpg" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(exists(&app, "a.jpg"));

    let (status, _) = app
        .json(
            Method::DELETE,
            &format!("/api/gallery/{}/photos", id),
            Some(&manager),
            json!({ "photoUrl": "/uploads/b.jpg?v=2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!exists(&app, "b.jpg"));

    let (status, _) = app
        .send(common::request(Method::DELETE, &format!("/api/gallery/{}", id), Some(&manager), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!exists(&app, "a.jpg"));
    Ok(())
}

#[tokio::test]
async fn removing_unknown_photo_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let manager = app.token_for(Role::Manager).await;
    let (_, album) = app
        .json(Method::POST, "/api/gallery", Some(&manager), json!({ "title": "Зима" }))
        .await;
    let id = album["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = app
        .json(
            Method::DELETE,
            &format!("/api/gallery/{}/photos", id),
            Some(&manager),
            json!({ "photoUrl": "/uploads/missing.jpg" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Photo not found in album");

    let (status, _) = app
        .json(Method::DELETE, &format!("/api/gallery/{}/photos", id), Some(&manager), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn multipart_photos_land_in_the_upload_dir() -> Result<()> {
    let app = TestApp::new();
    let manager = app.token_for(Role::Manager).await;
    let (_, album) = app
        .json(Method::POST, "/api/gallery", Some(&manager), json!({ "title": "Весна" }))
        .await;
    let id = album["id"].as_str().unwrap_or_default().to_string();

    let boundary = "novatorboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"photos\"; filename=\"kids.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\nfake-jpeg\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/gallery/{}/photos", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", manager))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))?;
    let (status, album) = app.send(request).await;
    assert_eq!(status, StatusCode::OK, "upload failed: {}", album);

    let url = album["photos"][0].as_str().unwrap_or_default().to_string();
    assert!(url.starts_with("/uploads/gallery-photo"), "unexpected url {}", url);
    let file_name = url.trim_start_matches("/uploads/");
    assert!(exists(&app, file_name));

    let (status, public) = app.get(&format!("/api/gallery/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["photos"][0], json!(url));
    Ok(())
}

#[tokio::test]
async fn editors_cannot_manage_gallery() -> Result<()> {
    let app = TestApp::new();
    let editor = app.token_for(Role::Editor).await;
    let (status, _) = app
        .json(Method::POST, "/api/gallery", Some(&editor), json!({ "title": "Лето" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}
