//! Series, season, and episode types shared by the ranker and the server.
//!
//! Wire-facing structs serialize in camelCase. Ratings keep the provider's
//! raw text so that sentinels such as `"N/A"` survive the round trip to
//! the client untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Sentinel the provider uses for a missing rating, poster, or count.
pub const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// MediaType
// ---------------------------------------------------------------------------

/// Kind of title reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Series,
    Movie,
    Episode,
    Game,
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Parse the provider's `Type` field. Unknown values map to `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "series" => Self::Series,
            "movie" => Self::Movie,
            "episode" => Self::Episode,
            "game" => Self::Game,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Series => write!(f, "series"),
            Self::Movie => write!(f, "movie"),
            Self::Episode => write!(f, "episode"),
            Self::Game => write!(f, "game"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Title / Series
// ---------------------------------------------------------------------------

/// A title as resolved by the provider, before it is known to be a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub external_id: String,
    pub title: String,
    pub media_type: MediaType,
    pub poster_url: Option<String>,
    pub synopsis: Option<String>,
    pub total_seasons: u32,
}

impl Title {
    /// Narrow this title to a [`Series`].
    ///
    /// Fails with [`Error::WrongMediaType`] for movies, episodes, and games.
    pub fn into_series(self) -> Result<Series> {
        if self.media_type != MediaType::Series {
            return Err(Error::wrong_media_type(self.media_type.to_string()));
        }
        Ok(Series {
            series_id: self.external_id,
            title: self.title,
            poster_url: self.poster_url,
            synopsis: self.synopsis,
            total_seasons: self.total_seasons,
        })
    }
}

/// A television series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Stable external identifier (an IMDb id such as `tt0903747`).
    pub series_id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub synopsis: Option<String>,
    pub total_seasons: u32,
}

// ---------------------------------------------------------------------------
// Rating / Episode / Season
// ---------------------------------------------------------------------------

/// An episode rating exactly as the provider reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(String);

impl Rating {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The rating exactly as the provider sent it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value for scoring, or `None` for sentinels and garbage.
    pub fn value(&self) -> Option<f64> {
        let raw = self.0.trim();
        if raw.eq_ignore_ascii_case(NOT_AVAILABLE) {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single episode of a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub episode_number: u32,
    pub title: String,
    pub rating: Rating,
}

/// A season with its episodes in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub season_number: u32,
    pub episodes: Vec<Episode>,
}

/// A season together with its computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSeason {
    pub season_number: u32,
    pub score: f64,
    pub episodes: Vec<Episode>,
}

/// Lookup response: the series and its seasons, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSeries {
    pub show: Series,
    pub ranked_seasons: Vec<RankedSeason>,
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// One autocomplete entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub title: String,
    pub year: String,
    pub external_id: String,
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}
