//! Spawns the app against a fresh database for every test.
use std::{net::SocketAddr, sync::OnceLock};

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Response;
use serde_json::{json, Value};
use uuid::Uuid;
use waitlist::{
    config::{get_or_init_config, AppConfig},
    database::DbManager,
    init_dbg_tracing, App,
};

pub struct TestApp {
    pub addr: SocketAddr,
    pub dm: DbManager,
    pub http_client: reqwest::Client,
}

/// Set `TEST_LOG` to see the server logs while testing.
fn init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_dbg_tracing();
        }
    });
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Like `spawn`, `configure` gets to tweak the config before the app is built.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        init_test_subscriber();

        let mut config = get_or_init_config().clone();
        config.db_config.db_name = Uuid::new_v4().to_string();
        // Trying to bind port 0 will trigger an OS scan for an available port.
        config.net_config.host = [127, 0, 0, 1];
        config.net_config.app_port = 0;
        // Tests share 127.0.0.1, only the rate limit tests want tight limits.
        config.rate_limit.global_max = 10_000;
        config.rate_limit.subscribe_max = 10_000;
        configure(&mut config);

        DbManager::create_database(&config).await?;
        let app = App::build_from_config(config).await?;
        let addr = app.local_addr()?;
        let dm = app.app_state.database_mgr.clone();

        tokio::spawn(waitlist::serve(app));

        Ok(TestApp {
            addr,
            dm,
            http_client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.http_client.get(self.url(path)).send().await?)
    }

    pub async fn post_subscribe(&self, body: &Value) -> Result<Response> {
        Ok(self
            .http_client
            .post(self.url("/api/subscribe"))
            .json(body)
            .send()
            .await?)
    }

    pub async fn subscribe_email(&self, email: &str) -> Result<Response> {
        self.post_subscribe(&json!({ "email": email })).await
    }

    /// Looks a token up by the stored (escaped) email.
    pub async fn unsubscribe_token_of(&self, email: &str) -> Result<String> {
        let token = sqlx::query_scalar("SELECT unsubscribe_token FROM subscribers WHERE email = $1")
            .bind(email)
            .fetch_one(self.dm.db())
            .await?;
        Ok(token)
    }

    pub async fn subscriber_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
            .fetch_one(self.dm.db())
            .await?;
        Ok(count)
    }

    /// Inserts a row directly, bypassing the API.
    /// `email` must already be in stored form: lowercased and HTML-escaped.
    pub async fn insert_fixture(
        &self,
        email: &str,
        subscribed_at: DateTime<Utc>,
        is_active: bool,
        confirmed: bool,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO subscribers (email, subscribed_at, is_active, confirmed, unsubscribe_token)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(email)
        .bind(subscribed_at)
        .bind(is_active)
        .bind(confirmed)
        .bind(Uuid::new_v4().to_string())
        .execute(self.dm.db())
        .await?;
        Ok(())
    }
}
