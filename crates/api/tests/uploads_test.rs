//! Router tests for admin uploads.

mod common;

use axum::body::Body;
use axum::http::{StatusCode, header};
use common::{MULTIPART_BOUNDARY, TestApp, multipart_body, request, spawn_app};
use serde_json::Value;

async fn upload(
    app: &TestApp,
    token: &str,
    filename: &str,
    content_type: &str,
    content: &[u8],
    fields: &[(&str, &str)],
) -> (StatusCode, Value) {
    let body = multipart_body(filename, content_type, content, fields);
    let mut req = request("POST", "/api/v1/admin/uploads", Some(token), Body::from(body));
    req.headers_mut().insert(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
            .parse()
            .unwrap(),
    );
    app.send(req).await
}

#[tokio::test]
async fn test_public_upload_returns_public_url() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = upload(
        &app,
        &token,
        "Hero Shot.png",
        "image/png",
        b"png-bytes",
        &[("folder", "previews"), ("visibility", "public"), ("naming", "hash")],
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["disk"], "public");
    assert_eq!(body["isPublic"], true);
    assert_eq!(body["originalName"], "Hero Shot.png");
    let path = body["path"].as_str().unwrap();
    assert!(path.starts_with("previews/hero-shot-"));
    assert!(path.ends_with(".png"));
    assert_eq!(body["url"], format!("/uploads/{path}"));
}

#[tokio::test]
async fn test_private_upload_round_trip() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = upload(
        &app,
        &token,
        "bundle.zip",
        "application/zip",
        b"zip-bytes",
        &[("folder", "bundles")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["disk"], "fs");
    let path = body["path"].as_str().unwrap().to_string();

    let (status, url) = app
        .get(&format!("/api/v1/admin/uploads/url?path={path}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(url["url"], format!("/api/v1/admin/files/{path}"));

    let (status, bytes) = app
        .send_raw(request(
            "GET",
            &format!("/api/v1/admin/files/{path}"),
            Some(&token),
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"zip-bytes");

    let (status, _) = app
        .delete(&format!("/api/v1/admin/uploads?path={path}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .get(&format!("/api/v1/admin/uploads/url?path={path}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disallowed_mime_type_is_rejected() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, body) = upload(
        &app,
        &token,
        "setup.exe",
        "application/x-msdownload",
        b"MZ",
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, _) = upload(&app, &token, "empty.png", "image/png", b"", &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_visibility_is_rejected() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, _) = upload(
        &app,
        &token,
        "a.png",
        "image/png",
        b"png",
        &[("visibility", "world")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_path_traversal_is_rejected() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let (status, _) = app
        .get("/api/v1/admin/uploads/url?path=../secrets.txt", Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
