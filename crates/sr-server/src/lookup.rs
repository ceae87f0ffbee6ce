//! Read-through orchestration for series lookups and suggestions.
//!
//! Every provider call goes through the shared cache first. Season fetches
//! for one series are issued concurrently and all run to completion; if any
//! of them fails the whole lookup fails and no partial ranking is returned.

use futures::future::join_all;

use sr_core::ranking;
use sr_core::{Error, MediaType, RankedSeries, Result, Season, Series, Suggestion, Title};

use crate::cache::{keys, CachedResponse};
use crate::context::AppContext;

/// Resolve `title` to a series and rank its seasons.
///
/// `title` must already be validated.
#[tracing::instrument(skip(ctx))]
pub async fn rank_series(ctx: &AppContext, title: &str) -> Result<RankedSeries> {
    let show = resolve_title(ctx, title).await?.into_series()?;
    let seasons = fetch_seasons(ctx, &show).await?;

    tracing::info!(
        series_id = %show.series_id,
        seasons = seasons.len(),
        "Ranked series"
    );

    Ok(RankedSeries {
        ranked_seasons: ranking::rank(seasons),
        show,
    })
}

/// Series whose titles match the partial `query`, at most
/// `suggest.max_results` of them.
///
/// `query` must already be validated. A provider "not found" yields an empty
/// list rather than an error.
#[tracing::instrument(skip(ctx))]
pub async fn suggest_series(ctx: &AppContext, query: &str) -> Result<Vec<Suggestion>> {
    let key = keys::suggest(query);

    let matches = match ctx.cache.get(&key) {
        Some(CachedResponse::Suggestions(cached)) => cached,
        _ => {
            let found = match ctx.provider.search_series(query).await {
                Ok(found) => found,
                Err(Error::NotFound(message)) => {
                    tracing::debug!(%message, "No suggestions");
                    Vec::new()
                }
                Err(e) => return Err(e),
            };
            let series_only: Vec<Suggestion> = found
                .into_iter()
                .filter(|s| s.media_type == MediaType::Series)
                .collect();
            ctx.cache
                .set(key, CachedResponse::Suggestions(series_only.clone()));
            series_only
        }
    };

    Ok(matches
        .into_iter()
        .take(ctx.config.suggest.max_results)
        .collect())
}

async fn resolve_title(ctx: &AppContext, title: &str) -> Result<Title> {
    let key = keys::title(title);
    if let Some(CachedResponse::Title(cached)) = ctx.cache.get(&key) {
        return Ok(cached);
    }

    let resolved = ctx.provider.title_metadata(title).await?;
    ctx.cache.set(key, CachedResponse::Title(resolved.clone()));
    Ok(resolved)
}

async fn fetch_seasons(ctx: &AppContext, show: &Series) -> Result<Vec<Season>> {
    let fetches = (1..=show.total_seasons).map(|n| fetch_season(ctx, &show.series_id, n));

    join_all(fetches)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()
        .inspect_err(|e| {
            tracing::warn!(series_id = %show.series_id, error = %e, "Season fetch failed");
        })
}

async fn fetch_season(ctx: &AppContext, series_id: &str, season_number: u32) -> Result<Season> {
    let key = keys::season(series_id, season_number);
    if let Some(CachedResponse::Season(cached)) = ctx.cache.get(&key) {
        return Ok(cached);
    }

    let season = ctx
        .provider
        .season_episodes(series_id, season_number)
        .await?;
    ctx.cache.set(key, CachedResponse::Season(season.clone()));
    Ok(season)
}
