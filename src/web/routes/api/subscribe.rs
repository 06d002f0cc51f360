use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    database::subscribers::{self, NewSubscriber, UpsertOutcome},
    web::{
        client_ip::ClientIp,
        types::{DataParsingError, DeserSubscriber, MessageBody, Token, ValidEmail},
        WebResult,
    },
    AppState,
};

const CREATED_MESSAGE: &str = "Thank you for subscribing! We'll let you know as soon as we launch.";
const REACTIVATED_MESSAGE: &str = "Welcome back! Your subscription has been reactivated.";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("email is already subscribed")]
    AlreadySubscribed,

    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
}

// ###################################
// ->   API
// ###################################
#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(app_state, client_ip, headers, payload),
    fields(client_ip = %client_ip, email = tracing::field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    client_ip: ClientIp,
    headers: HeaderMap,
    payload: Result<Json<DeserSubscriber>, JsonRejection>,
) -> WebResult<(StatusCode, Json<MessageBody>)> {
    let Json(subscriber) = payload.map_err(SubscribeError::InvalidBody)?;
    let email: ValidEmail = subscriber.try_into().map_err(SubscribeError::DataParsing)?;
    tracing::Span::current().record("email", email.as_ref());

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(str::to_string);

    let new_subscriber = NewSubscriber {
        email: email.as_ref().to_string(),
        ip_address: Some(client_ip.to_string()),
        user_agent,
        confirmation_token: Token::generate().into_inner(),
        unsubscribe_token: Token::generate().into_inner(),
    };

    let db = app_state.database_mgr.db();
    let outcome = match subscribers::insert_or_reactivate(db, &new_subscriber, Utc::now()).await {
        Ok(outcome) => outcome,
        // The upsert absorbs email conflicts, anything left is most likely a colliding token.
        Err(er) if er.is_unique_violation() => {
            warn!(
                email = %email,
                constraint = er.constraint().unwrap_or("unknown"),
                "Unique violation left over after the upsert"
            );
            UpsertOutcome::AlreadyActive
        }
        Err(er) => return Err(er.into()),
    };

    info!(email = %email, client_ip = %client_ip, ?outcome, "Subscription request handled");

    match outcome {
        UpsertOutcome::Created => Ok((
            StatusCode::CREATED,
            Json(MessageBody::success(CREATED_MESSAGE)),
        )),
        UpsertOutcome::Reactivated => Ok((
            StatusCode::OK,
            Json(MessageBody::success(REACTIVATED_MESSAGE)),
        )),
        UpsertOutcome::AlreadyActive => Err(SubscribeError::AlreadySubscribed.into()),
    }
}
