//! Queries against the `subscribers` table.
//!
//! Rows are never deleted. Unsubscribing flips `is_active` and subscribing again flips it back,
//! so `email` and `unsubscribe_token` stay unique for the lifetime of the table.

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::Result;

// ###################################
// ->   STRUCTS
// ###################################
/// Everything needed to insert a subscriber. `email` must already be normalized.
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub confirmation_token: String,
    pub unsubscribe_token: String,
}

/// What `insert_or_reactivate` did with the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Reactivated,
    AlreadyActive,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct SubscriberStats {
    pub total_subscribers: i64,
    pub active_subscribers: i64,
    pub confirmed_subscribers: i64,
    pub today_signups: i64,
    pub week_signups: i64,
    pub month_signups: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ExportedSubscriber {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub is_active: bool,
    pub confirmed: bool,
}

/// Lower bounds of the signup buckets reported by the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub today_start: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
}

impl StatsWindow {
    /// `today` starts at midnight in the timezone of `now`; week and month are rolling 7 and 30 days.
    pub fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let midnight = now.date_naive().and_time(NaiveTime::MIN);
        let today_start = now
            .timezone()
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            // Midnight fell into a DST gap.
            .unwrap_or_else(|| midnight.and_utc());

        let now = now.with_timezone(&Utc);
        StatsWindow {
            today_start,
            week_start: now - TimeDelta::days(7),
            month_start: now - TimeDelta::days(30),
        }
    }
}

// ###################################
// ->   QUERIES
// ###################################
/// Inserts a new subscriber, or reactivates an existing inactive one, in a single statement.
///
/// An active row with the same email is left untouched and reported as `AlreadyActive`.
/// `xmax` is zero only for freshly inserted tuples, which tells an insert apart from an update.
pub async fn insert_or_reactivate(
    db: &PgPool,
    subscriber: &NewSubscriber,
    now: DateTime<Utc>,
) -> Result<UpsertOutcome> {
    let inserted: Option<bool> = sqlx::query_scalar(
        r#"
        INSERT INTO subscribers
            (email, subscribed_at, ip_address, user_agent, is_active, confirmed, confirmation_token, unsubscribe_token)
        VALUES ($1, $2, $3, $4, TRUE, FALSE, $5, $6)
        ON CONFLICT (email) DO UPDATE
            SET is_active = TRUE, subscribed_at = EXCLUDED.subscribed_at
            WHERE subscribers.is_active = FALSE
        RETURNING (xmax = 0) AS inserted
    "#,
    )
    .bind(&subscriber.email)
    .bind(now)
    .bind(subscriber.ip_address.as_deref())
    .bind(subscriber.user_agent.as_deref())
    .bind(&subscriber.confirmation_token)
    .bind(&subscriber.unsubscribe_token)
    .fetch_optional(db)
    .await?;

    let outcome = match inserted {
        Some(true) => UpsertOutcome::Created,
        Some(false) => UpsertOutcome::Reactivated,
        None => UpsertOutcome::AlreadyActive,
    };

    Ok(outcome)
}

/// Deactivates the subscriber owning `unsubscribe_token` and returns its email.
/// Matches already inactive rows too, so following the same link twice succeeds twice.
pub async fn deactivate_by_token(db: &PgPool, unsubscribe_token: &str) -> Result<Option<String>> {
    let email = sqlx::query_scalar(
        r#"UPDATE subscribers
        SET is_active = FALSE
        WHERE unsubscribe_token = $1
        RETURNING email"#,
    )
    .bind(unsubscribe_token)
    .fetch_optional(db)
    .await?;

    Ok(email)
}

pub async fn stats(db: &PgPool, window: StatsWindow) -> Result<SubscriberStats> {
    let stats = sqlx::query_as(
        r#"
        SELECT
            COUNT(*) AS total_subscribers,
            COUNT(*) FILTER (WHERE is_active) AS active_subscribers,
            COUNT(*) FILTER (WHERE confirmed) AS confirmed_subscribers,
            COUNT(*) FILTER (WHERE subscribed_at >= $1) AS today_signups,
            COUNT(*) FILTER (WHERE subscribed_at >= $2) AS week_signups,
            COUNT(*) FILTER (WHERE subscribed_at >= $3) AS month_signups
        FROM subscribers
    "#,
    )
    .bind(window.today_start)
    .bind(window.week_start)
    .bind(window.month_start)
    .fetch_one(db)
    .await?;

    Ok(stats)
}

/// All active subscribers, newest first.
pub async fn export_active(db: &PgPool) -> Result<Vec<ExportedSubscriber>> {
    let subscribers = sqlx::query_as(
        r#"
        SELECT email, subscribed_at, is_active, confirmed
        FROM subscribers
        WHERE is_active
        ORDER BY subscribed_at DESC, id DESC
    "#,
    )
    .fetch_all(db)
    .await?;

    Ok(subscribers)
}
