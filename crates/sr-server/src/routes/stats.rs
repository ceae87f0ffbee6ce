//! Runtime statistics for the in-memory services.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::cache::CacheStats;
use crate::context::AppContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub cache: CacheStats,
    pub rate_limit_windows: usize,
}

/// GET /stats
pub async fn stats(State(ctx): State<AppContext>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache: ctx.cache.stats(),
        rate_limit_windows: ctx.limiter.tracked_windows(),
    })
}
