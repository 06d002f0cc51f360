use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn landing_page_is_served_at_root() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.text().await?;
    assert!(body.contains("subscribe-form"));

    Ok(())
}

#[tokio::test]
async fn client_script_is_served() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/script.js").await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("/api/subscribe"));

    Ok(())
}

#[tokio::test]
async fn unknown_static_file_404() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/does-not-exist.png").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
