use anyhow::Result;
use chrono::{TimeDelta, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::helpers::TestApp;

#[tokio::test]
async fn stats_on_empty_table_are_zero() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.get("/api/stats").await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": {
                "total_subscribers": 0,
                "active_subscribers": 0,
                "confirmed_subscribers": 0,
                "today_signups": 0,
                "week_signups": 0,
                "month_signups": 0,
            }
        })
    );

    Ok(())
}

#[tokio::test]
async fn stats_count_each_subset_of_the_fixture() -> Result<()> {
    let app = TestApp::spawn().await?;
    let now = Utc::now();

    app.insert_fixture("today@example.com", now, true, true).await?;
    app.insert_fixture("days3@example.com", now - TimeDelta::days(3), false, false)
        .await?;
    app.insert_fixture("days20@example.com", now - TimeDelta::days(20), true, false)
        .await?;
    app.insert_fixture("days60@example.com", now - TimeDelta::days(60), true, true)
        .await?;

    let body: Value = app.get("/api/stats").await?.json().await?;
    let data = &body["data"];

    assert_eq!(body["success"], true);
    assert_eq!(data["total_subscribers"], 4);
    assert_eq!(data["active_subscribers"], 3);
    assert_eq!(data["confirmed_subscribers"], 2);
    assert_eq!(data["today_signups"], 1);
    assert_eq!(data["week_signups"], 2);
    assert_eq!(data["month_signups"], 3);

    Ok(())
}
