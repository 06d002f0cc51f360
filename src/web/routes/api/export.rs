use axum::{extract::State, Json};

use crate::{
    database::subscribers,
    web::{types::ExportBody, WebResult},
    AppState,
};

#[tracing::instrument(name = "Exporting active subscribers", skip_all)]
pub async fn export(State(app_state): State<AppState>) -> WebResult<Json<ExportBody>> {
    let data = subscribers::export_active(app_state.database_mgr.db()).await?;
    tracing::debug!(count = data.len(), "Exported subscribers");

    Ok(Json(ExportBody {
        success: true,
        count: data.len(),
        data,
    }))
}
