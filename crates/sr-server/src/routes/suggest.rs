//! Autocomplete: series matching a partial title.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use sr_core::validation::validate_title;

use crate::context::AppContext;
use crate::lookup;
use crate::middleware::request_id::RequestId;
use crate::rate_limit::{client_identity, QuotaClass};
use crate::routes::{cacheable, path_param, respond};

const FALLBACK: &str = "Failed to fetch suggestions";

/// GET /suggest/{query}
pub async fn suggest_series(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    query: Result<Path<String>, PathRejection>,
) -> Response {
    let outcome = handle(&ctx, &headers, query).await;
    respond(&ctx, request_id, FALLBACK, outcome)
}

async fn handle(
    ctx: &AppContext,
    headers: &HeaderMap,
    raw_query: Result<Path<String>, PathRejection>,
) -> sr_core::Result<Response> {
    let raw_query = path_param(raw_query)?;
    // Partial titles follow the same character and length rules as full ones.
    let query = validate_title(&raw_query)?;

    let class = QuotaClass::Suggest;
    let decision = ctx
        .limiter
        .check(class, &client_identity(headers), class.quota(&ctx.config.rate_limits))
        .into_result()?;

    let suggestions = lookup::suggest_series(ctx, &query).await?;
    Ok(cacheable(Json(suggestions).into_response(), &decision))
}
