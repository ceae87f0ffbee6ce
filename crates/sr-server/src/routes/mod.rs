//! Route handlers for the HTTP API.

pub mod health;
pub mod search;
pub mod stats;
pub mod suggest;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use sr_core::Error;

use crate::context::AppContext;
use crate::error::AppError;
use crate::middleware::request_id::RequestId;
use crate::rate_limit::RateLimitDecision;

/// Lookup results change rarely; let intermediaries cache and revalidate.
pub const PUBLIC_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";

/// Decorate a successful lookup response with budget and caching headers.
pub(crate) fn cacheable(mut response: Response, decision: &RateLimitDecision) -> Response {
    let headers = response.headers_mut();
    decision.apply_headers(headers);
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(PUBLIC_CACHE_CONTROL),
    );
    response
}

/// Unwrap a single path parameter, reporting a malformed one (e.g. invalid
/// percent-encoded UTF-8) as a validation error.
pub(crate) fn path_param(param: Result<Path<String>, PathRejection>) -> sr_core::Result<String> {
    param.map(|Path(value)| value).map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "Rejected path parameter");
        Error::Validation("Title contains invalid characters".into())
    })
}

/// Turn a handler outcome into a response, hiding unsafe error detail.
pub(crate) fn respond(
    ctx: &AppContext,
    request_id: RequestId,
    fallback: &'static str,
    outcome: sr_core::Result<Response>,
) -> Response {
    match outcome {
        Ok(response) => response,
        Err(e) => AppError::new(e)
            .with_fallback(fallback)
            .exposing(ctx.config.server.expose_errors)
            .with_request_id(request_id.0)
            .into_response(),
    }
}
