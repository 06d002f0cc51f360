//! Backend of a "coming soon" landing page.
//!
//! Serves the static page and a small JSON API that captures, deactivates, counts and exports
//! subscriber emails stored in Postgres.

pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod templ_manager;
pub mod utils;
pub mod web;

// re-exports
pub use app::{App, AppState};
pub use error::{Error, Result};
pub use web::serve::serve;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,waitlist=debug,tower_http=info,sqlx=warn";

/// Human readable, compact logs for local development.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(env_filter())
        .compact()
        .init();
}

/// JSON lines for production, one object per event with the current span attached.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_env_filter(env_filter())
        .init();
}

/// `RUST_LOG` wins over the default filter.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
