//! Cross-cutting layers applied to every declared route, plus the preflight responder.
//!
//! Both layers are `axum::middleware::from_fn` functions attached with
//! `route_layer`, so a path's method fallback and its synthesized preflight stay
//! outside them.

use crate::logger::RequestLogger;
use axum::extract::{Request, State};
use axum::middleware::{from_fn, from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use http::{HeaderValue, StatusCode};
use std::sync::Arc;

pub const ALLOWED_ORIGIN: &str = "*";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Wrap every method of `method_router` with request logging (outermost) and CORS
/// headers (innermost).
pub(crate) fn cross_cutting<S>(
    method_router: MethodRouter<S>,
    logger: Arc<dyn RequestLogger>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    method_router
        .route_layer(from_fn(cors_headers))
        .route_layer(from_fn_with_state(logger, log_requests))
}

async fn log_requests(
    State(logger): State<Arc<dyn RequestLogger>>,
    request: Request,
    next: Next,
) -> Response {
    let line = format!("{} {}", request.method(), request.uri().path());
    logger.info(&line);

    let response = next.run(request).await;
    if response.status().is_server_error() {
        logger.error(&format!("{line} failed with {}", response.status()));
    }
    response
}

async fn cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOWED_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

/// Answer a CORS preflight: `{}` with the path's methods advertised.
///
/// Browsers send preflights without credentials, so this never authenticates.
pub(crate) fn preflight_response(allowed_methods: &HeaderValue) -> Response {
    (
        StatusCode::OK,
        [
            (
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static(ALLOWED_ORIGIN),
            ),
            (ACCESS_CONTROL_ALLOW_METHODS, allowed_methods.clone()),
            (
                ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            ),
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
        ],
        "{}",
    )
        .into_response()
}
