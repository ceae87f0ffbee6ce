//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`sr_core::Error`] so that route handlers
//! can return failures directly. Messages are filtered through
//! [`sr_core::Error::public_message`] unless error exposure is enabled.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::rate_limit::{X_RATE_LIMIT_REMAINING, X_RATE_LIMIT_RESET};

/// Message used when no handler-specific fallback was supplied.
const DEFAULT_FALLBACK: &str = "Something went wrong";

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: sr_core::Error,
    request_id: Option<String>,
    fallback: &'static str,
    expose: bool,
}

impl AppError {
    pub fn new(inner: sr_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
            fallback: DEFAULT_FALLBACK,
            expose: false,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Message shown in place of anything not known to be safe.
    pub fn with_fallback(mut self, fallback: &'static str) -> Self {
        self.fallback = fallback;
        self
    }

    /// Pass the full error text through to the client.
    pub fn exposing(mut self, expose: bool) -> Self {
        self.expose = expose;
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if matches!(self.inner, sr_core::Error::NotFound(_)) {
            tracing::debug!(error = %self.inner, "Lookup found nothing");
        } else if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.public_message(self.expose, self.fallback),
            "code": self.inner.code(),
            "request_id": self.request_id,
        });

        let mut response = (status, axum::Json(body)).into_response();

        if let sr_core::Error::RateLimited {
            retry_after_secs,
            reset_at_ms,
        } = self.inner
        {
            insert_throttle_headers(response.headers_mut(), retry_after_secs, reset_at_ms);
        }

        response
    }
}

fn insert_throttle_headers(headers: &mut HeaderMap, retry_after_secs: u64, reset_at_ms: i64) {
    headers.insert(
        axum::http::header::RETRY_AFTER,
        HeaderValue::from(retry_after_secs),
    );
    headers.insert(X_RATE_LIMIT_REMAINING.clone(), HeaderValue::from(0_u32));
    headers.insert(X_RATE_LIMIT_RESET.clone(), HeaderValue::from(reset_at_ms));
}
