use std::{net::SocketAddr, time::Duration};

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{
        header::{self, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request, Response,
    },
    middleware, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{error, info, Span};

use crate::{config::ConfigResult, App, AppState, Result};

use super::{midware, routes::routes, REQUEST_ID_HEADER};

/// Largest request body we accept, subscribe payloads are tiny.
const BODY_LIMIT_BYTES: usize = 10 * 1024;

/// The core async function serving this application until a shutdown signal arrives.
///
/// Wraps the routes with request ids, tracing, CORS, body limit and security headers,
/// and maps errors to client responses.
/// Closes the database pool once the server has drained.
pub async fn serve(app: App) -> Result<()> {
    let App {
        app_state,
        listener,
    } = app;

    let router = build_router(app_state.clone())?;

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("{:<20} - Server stopped, closing the DB pool", "serve");
    app_state.database_mgr.close().await;

    Ok(())
}

/// Builds the fully layered application `Router`.
pub fn build_router(app_state: AppState) -> ConfigResult<Router> {
    let x_request_id: HeaderName = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace_layer = build_trace_layer();
    let cors_layer = build_cors_layer(&app_state)?;

    let app = Router::new().merge(routes(app_state)).layer(
        ServiceBuilder::new()
            // Set UUID per request
            .layer(SetRequestIdLayer::new(
                x_request_id.clone(),
                MakeRequestUuid,
            ))
            .layer(trace_layer)
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            ))
            // This has to be in front of the Propagation layer because while the request goes through
            // middleware as listed in the ServiceBuilder, the response goes through the middleware stack from the bottom up.
            // If we want the response mapper to find the Propagated header that middleware has to run first!
            .layer(middleware::map_response(midware::response_mapper))
            // Propagate UUID to response, keep it last so it processes the response first!
            .layer(PropagateRequestIdLayer::new(x_request_id))
            .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
    );

    Ok(app)
}

/// Local development accepts any origin, production only the configured one.
fn build_cors_layer(app_state: &AppState) -> ConfigResult<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let cors = if app_state.environment.is_production() {
        cors.allow_origin(app_state.net_config.allowed_origin_header()?)
    } else {
        cors.allow_origin(Any)
    };

    Ok(cors)
}

/// A helper function that sets up the `tower_http::TraceLayer` - tracing configuration.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let uuid = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .map(|uuid| uuid.to_str().unwrap_or("").to_string());

            tracing::error_span!(
                "serve",
                id = uuid,
                method = req.method().to_string(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _s: &Span| tracing::info!("START @ {}", req.uri()))
        .on_response(|res: &Response<Body>, latency: Duration, _s: &Span| {
            let st_code = res.status();

            if st_code.is_server_error() {
                tracing::error!("END in: {:?} - STATUS: {}", latency, st_code.as_u16())
            } else {
                tracing::info!("END in: {:?} - STATUS: {}", latency, st_code.as_u16())
            }
        })
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(er) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl+C: {er}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(er) => {
                error!("failed to listen for SIGTERM: {er}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
