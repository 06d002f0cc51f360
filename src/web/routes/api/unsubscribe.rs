use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use tera::Context;
use tracing::{error, info};

use crate::{
    database::subscribers,
    web::{types::Token, WebResult},
    AppState,
};

/// Deactivates the subscriber owning `token`.
/// This is the link people click in their mail client, so it always answers with an HTML page.
#[tracing::instrument(name = "Unsubscribing a subscriber", skip_all)]
pub async fn unsubscribe(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
) -> WebResult<(StatusCode, Html<String>)> {
    let templ_mgr = &app_state.templ_mgr;

    let Ok(token) = Token::parse(&token) else {
        return not_found(&app_state);
    };

    match subscribers::deactivate_by_token(app_state.database_mgr.db(), &token).await {
        Ok(Some(email)) => {
            info!(email = %email, "Subscriber deactivated");
            let mut ctx = Context::new();
            ctx.insert("email", &email);
            let page = templ_mgr.render_html("unsubscribed.html", &ctx)?;
            Ok((StatusCode::OK, Html(page)))
        }
        Ok(None) => not_found(&app_state),
        Err(er) => {
            error!(error = %er, "Failed to unsubscribe");
            let page = templ_mgr.render_html("unsubscribe_error.html", &Context::new())?;
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Html(page)))
        }
    }
}

fn not_found(app_state: &AppState) -> WebResult<(StatusCode, Html<String>)> {
    let page = app_state
        .templ_mgr
        .render_html("unsubscribe_not_found.html", &Context::new())?;
    Ok((StatusCode::NOT_FOUND, Html(page)))
}
