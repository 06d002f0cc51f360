//! Database pool management and the `subscribers` table queries.

pub mod subscribers;

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Connection, PgConnection, PgPool};
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone, Debug)]
pub struct DbManager {
    db: PgPool,
}

impl DbManager {
    /// Connects the pool and brings the schema up to date.
    pub async fn init(config: &AppConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let max_cons = if cfg!(test) { 1 } else { 5 };

        let con_opts = config.db_config.connection_options();

        let db_pool = PgPoolOptions::new()
            .max_connections(max_cons)
            .acquire_timeout(Duration::from_millis(2000))
            .connect_with(con_opts)
            .await
            .map_err(|er| Error::FailToCreatePool(er.to_string()))?;

        sqlx::migrate!("./migrations").run(&db_pool).await?;
        info!("{:<20} - Migrations applied", "init_db");

        Ok(Self { db: db_pool })
    }

    /// Creates the database named in the config. Used by the integration tests
    /// so that every test runs against its own empty database.
    pub async fn create_database(config: &AppConfig) -> Result<()> {
        let db_config = &config.db_config;
        let mut connection =
            PgConnection::connect_with(&db_config.connection_options_without_db()).await?;

        let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name);
        sqlx::query(&sql).execute(&mut connection).await?;

        Ok(())
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Trivial round trip to check that the database is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.db.close().await
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    /// Whether the store rejected a write because of a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Sqlx(sqlx::Error::Database(er)) => er.code().is_some_and(|code| code == "23505"),
            _ => false,
        }
    }

    /// Name of the constraint the store reported, if any.
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Error::Sqlx(sqlx::Error::Database(er)) => er.constraint(),
            _ => None,
        }
    }
}
