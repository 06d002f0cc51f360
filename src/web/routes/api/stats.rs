use axum::{extract::State, Json};
use chrono::Local;

use crate::{
    database::subscribers::{self, StatsWindow, SubscriberStats},
    web::{types::DataBody, WebResult},
    AppState,
};

/// Aggregate subscriber counts. Signup buckets use the server's local day boundaries.
#[tracing::instrument(name = "Computing subscriber stats", skip_all)]
pub async fn stats(State(app_state): State<AppState>) -> WebResult<Json<DataBody<SubscriberStats>>> {
    let window = StatsWindow::at(&Local::now());
    let stats = subscribers::stats(app_state.database_mgr.db(), window).await?;

    Ok(Json(DataBody {
        success: true,
        data: stats,
    }))
}
