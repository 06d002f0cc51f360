use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::error;

use crate::{web::types::HealthBody, AppState};

/// Reports whether the database answers a trivial query. Does not retry.
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    let timestamp = Utc::now().to_rfc3339();

    match app_state.database_mgr.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthBody {
                success: true,
                message: "Server is healthy",
                timestamp,
            }),
        ),
        Err(er) => {
            error!(error = %er, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthBody {
                    success: false,
                    message: "Database connection failed",
                    timestamp,
                }),
            )
        }
    }
}
