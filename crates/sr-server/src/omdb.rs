//! OMDb (Open Movie Database) API client.
//!
//! Provides title lookup, per-season episode lists, and series search.
//! Outbound calls are throttled to the configured requests per second.
//!
//! OMDb reports failures as a JSON body with an `Error` field, often with a
//! 200 status. [`classify_provider_error`] is the only place that inspects
//! that text.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use sr_core::config::OmdbConfig;
use sr_core::{
    Episode, Error, MediaType, Rating, Result, Season, Suggestion, Title, NOT_AVAILABLE,
};

use crate::provider::SeriesProvider;

const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl OmdbClient {
    /// Build a client from configuration.
    ///
    /// A missing API key is not an error here; every request made without one
    /// fails with [`Error::UpstreamUnavailable`].
    pub fn new(config: &OmdbConfig) -> Result<Self> {
        let per_second = NonZeroU32::new(config.requests_per_second)
            .or(NonZeroU32::new(DEFAULT_REQUESTS_PER_SECOND))
            .unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Unexpected(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            limiter,
        })
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::UpstreamUnavailable("OMDb API key not configured".into()))?;

        self.limiter.until_ready().await;

        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", api_key));

        let resp = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("OMDb request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("OMDb read error: {e}")))?;

        // Error bodies may arrive with any status, so look for them first.
        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) if status.is_success() => {
                return Err(Error::UpstreamUnavailable(format!("OMDb parse error: {e}")));
            }
            Err(_) => return Err(Error::UpstreamUnavailable(format!("OMDb {status}"))),
        };

        if let Some(message) = value.get("Error").and_then(|e| e.as_str()) {
            return Err(classify_provider_error(message));
        }

        if !status.is_success() {
            return Err(Error::UpstreamUnavailable(format!("OMDb {status}")));
        }

        serde_json::from_value(value)
            .map_err(|e| Error::UpstreamUnavailable(format!("OMDb parse error: {e}")))
    }
}

#[async_trait]
impl SeriesProvider for OmdbClient {
    async fn title_metadata(&self, title: &str) -> Result<Title> {
        let raw: OmdbTitle = self.get(&[("t", title)]).await?;
        Ok(raw.into_title())
    }

    async fn season_episodes(&self, series_id: &str, season_number: u32) -> Result<Season> {
        let season = season_number.to_string();
        let raw: OmdbSeason = self
            .get(&[("i", series_id), ("Season", season.as_str())])
            .await?;
        Ok(raw.into_season(season_number))
    }

    async fn search_series(&self, query: &str) -> Result<Vec<Suggestion>> {
        let raw: OmdbSearchResponse = self
            .get(&[("s", query), ("type", "series"), ("page", "1")])
            .await?;
        Ok(raw
            .search
            .into_iter()
            .map(OmdbSearchItem::into_suggestion)
            .collect())
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}

/// Turn a provider-declared error message into a typed failure.
///
/// Any message containing "not found" (case-insensitive), such as
/// "Series not found!" or "Movie not found!", is [`Error::NotFound`]; all
/// others ("Invalid API key!", "Request limit reached!") mean the provider is
/// unusable for now.
pub fn classify_provider_error(message: &str) -> Error {
    if message.to_lowercase().contains("not found") {
        Error::NotFound(message.to_string())
    } else {
        Error::UpstreamUnavailable(message.to_string())
    }
}

fn available(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OmdbTitle {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Type", default)]
    media_type: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Plot")]
    plot: Option<String>,
    #[serde(rename = "totalSeasons")]
    total_seasons: Option<String>,
}

impl OmdbTitle {
    fn into_title(self) -> Title {
        let total_seasons = self
            .total_seasons
            .as_deref()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Title {
            external_id: self.imdb_id,
            title: self.title,
            media_type: MediaType::parse(&self.media_type),
            poster_url: available(self.poster),
            synopsis: available(self.plot),
            total_seasons,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmdbSeason {
    #[serde(rename = "Episodes", default)]
    episodes: Vec<OmdbEpisode>,
}

impl OmdbSeason {
    fn into_season(self, season_number: u32) -> Season {
        let episodes = self
            .episodes
            .into_iter()
            .zip(1_u32..)
            .map(|(ep, position)| Episode {
                // Unparseable numbers fall back to the provider position.
                episode_number: ep
                    .episode
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .unwrap_or(position),
                title: ep.title,
                rating: Rating::new(ep.imdb_rating),
            })
            .collect();
        Season {
            season_number,
            episodes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmdbEpisode {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Episode", default)]
    episode: String,
    #[serde(rename = "imdbRating", default = "not_available")]
    imdb_rating: String,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Type", default)]
    media_type: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

impl OmdbSearchItem {
    fn into_suggestion(self) -> Suggestion {
        Suggestion {
            title: self.title,
            year: self.year,
            external_id: self.imdb_id,
            media_type: MediaType::parse(&self.media_type),
            poster_url: available(self.poster),
        }
    }
}
