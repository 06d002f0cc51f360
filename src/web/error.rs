use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::routes::SubscribeError;
use crate::database;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),

    #[error("rate limiter '{limiter}' exceeded, retry after {retry_after_secs}s")]
    RateLimited {
        limiter: &'static str,
        message: &'static str,
        retry_after_secs: u64,
    },
    #[error("no route matched: {0}")]
    RouteNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] database::Error),
    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Subscribe(SubscribeError::AlreadySubscribed) => {
                (StatusCode::CONFLICT, AlreadySubscribed)
            }
            Error::Subscribe(SubscribeError::InvalidBody(rejection))
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                (StatusCode::PAYLOAD_TOO_LARGE, PayloadTooLarge)
            }
            Error::Subscribe(SubscribeError::InvalidBody(_)) => (
                StatusCode::BAD_REQUEST,
                InvalidInput("Invalid request body".to_string()),
            ),
            Error::Subscribe(SubscribeError::DataParsing(data_er)) => {
                (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string()))
            }
            Error::RateLimited {
                message,
                retry_after_secs,
                ..
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                TooManyRequests {
                    message: *message,
                    retry_after_secs: *retry_after_secs,
                },
            ),
            Error::RouteNotFound(_) => (StatusCode::NOT_FOUND, NotFound),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// The part of an `Error` that the client gets to see.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(String),
    #[display("This email is already subscribed")]
    AlreadySubscribed,
    #[display("Request body too large")]
    PayloadTooLarge,
    #[display("Endpoint not found")]
    NotFound,
    #[display("{message}")]
    TooManyRequests {
        message: &'static str,
        retry_after_secs: u64,
    },
    #[display("Something went wrong. Please try again later.")]
    ServiceError,
}
