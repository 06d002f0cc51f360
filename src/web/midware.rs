use std::sync::Arc;

use axum::{
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::{error::ClientError, log, Error, REQUEST_ID_HEADER};

/// Turns an `Error` stored in the response extensions into the JSON body the client sees
/// and logs the request.
pub async fn response_mapper(
    req_method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    resp: Response,
) -> Response {
    let request_id = req_headers
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let client_error_body = json!({
            "success": false,
            "message": cl_err.to_string(),
            "request_id": request_id,
        });

        let mut res = (*status, Json(client_error_body)).into_response();
        if let ClientError::TooManyRequests {
            retry_after_secs, ..
        } = cl_err
        {
            res.headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }
        res
    });

    log::log_request(
        &request_id,
        &req_method,
        &uri,
        resp.status(),
        web_error,
        client_status_and_error.as_ref(),
    );

    err_resp.unwrap_or(resp)
}
