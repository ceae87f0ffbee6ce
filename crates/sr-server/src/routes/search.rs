//! Series lookup: resolve a title and rank its seasons.

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

const FALLBACK: &str = "Failed to search for show";

/// GET /search/{title}: the series and its seasons, best first.
pub async fn search_series(
    State(ctx): State<AppContext>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    title: Result<Path<String>, PathRejection>,
) -> Response {
    let outcome = handle(&ctx, &headers, title).await;
    respond(&ctx, request_id, FALLBACK, outcome)
}

async fn handle(
    ctx: &AppContext,
    headers: &HeaderMap,
    raw_title: Result<Path<String>, PathRejection>,
) -> sr_core::Result<Response> {
    let raw_title = path_param(raw_title)?;
    let title = validate_title(&raw_title)?;

    let class = QuotaClass::Search;
    let decision = ctx
        .limiter
        .check(class, &client_identity(headers), class.quota(&ctx.config.rate_limits))
        .into_result()?;

    let ranked = lookup::rank_series(ctx, &title).await?;
    Ok(cacheable(Json(ranked).into_response(), &decision))
}
