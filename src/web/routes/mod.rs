//! Contains all the routes that this application can handle.

mod api;

// re-export errors
pub use api::subscribe::SubscribeError;

use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::{
    web::{rate_limit, Error, WebResult},
    AppState,
};

/// All the routes of the server.
/// The API lives under "/api", everything else is served from the static directory.
pub fn routes(app_state: AppState) -> Router {
    let static_files =
        ServeDir::new(&app_state.net_config.static_dir).append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api_routes(app_state.clone()))
        .fallback_service(static_files)
        .layer(middleware::from_fn_with_state(
            app_state,
            rate_limit::global_rate_limit,
        ))
}

/// API - Routes nested under "/api" path
fn api_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/subscribe",
            post(api::subscribe).route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                rate_limit::subscribe_rate_limit,
            )),
        )
        .route("/unsubscribe/{token}", get(api::unsubscribe))
        .route("/stats", get(api::stats))
        .route("/export", get(api::export))
        .route("/health", get(api::health))
        .fallback(api_not_found)
        .with_state(app_state)
}

async fn api_not_found(uri: Uri) -> WebResult<()> {
    Err(Error::RouteNotFound(uri.to_string()))
}
