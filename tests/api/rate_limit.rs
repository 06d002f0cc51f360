use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

#[tokio::test]
async fn subscribe_is_limited_per_client() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.rate_limit.subscribe_max = 2).await?;

    for i in 0..2 {
        let res = app.subscribe_email(&format!("user{i}@example.com")).await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()["ratelimit-limit"], "2");
    }

    let res = app.subscribe_email("user2@example.com").await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = res.headers()["retry-after"].to_str()?.parse()?;
    assert!(retry_after > 0 && retry_after <= 15 * 60);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Too many subscription attempts, please try again later."
    );
    assert_eq!(app.subscriber_count().await?, 2);

    // Other endpoints only count against the global limit.
    let res = app.get("/api/health").await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn every_request_counts_against_global_limit() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.rate_limit.global_max = 3).await?;

    for _ in 0..3 {
        let res = app.get("/api/stats").await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = app.get("/").await?;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Too many requests, please try again later.");

    Ok(())
}
