//! Tests whether the health route reports the database state and unknown API paths 404.

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

#[tokio::test]
async fn health_ok() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/api/health").await?;
    assert_eq!(res.status(), StatusCode::OK, "Healthcheck FAILED!");

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is healthy");
    let timestamp = body["timestamp"].as_str().expect("timestamp is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());

    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.dm.close().await;

    let res = app.get("/api/health").await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Database connection failed");

    Ok(())
}

#[tokio::test]
async fn invalid_api_path_404() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/api/invalidpath").await?;

    assert_eq!(
        res.status(),
        StatusCode::NOT_FOUND,
        "Invalid Path check FAILED!, expected: {}, got: {}",
        404,
        res.status().as_u16()
    );
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Endpoint not found");

    Ok(())
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/api/health").await?;
    let headers = res.headers();

    assert!(headers.contains_key("x-request-id"));
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");

    Ok(())
}
