//! Trait boundary for upstream series data.
//!
//! Handlers depend on [`SeriesProvider`] rather than a concrete HTTP client,
//! so the OMDb adapter can be swapped for a fake in tests. Implementations
//! own all classification of provider errors: callers branch on
//! [`sr_core::Error`] variants, never on message text.

use async_trait::async_trait;

use sr_core::{Result, Season, Suggestion, Title};

#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Resolve a title by exact name.
    ///
    /// Returns [`sr_core::Error::NotFound`] when the provider has no match.
    async fn title_metadata(&self, title: &str) -> Result<Title>;

    /// Fetch the episodes of one season of a series.
    async fn season_episodes(&self, series_id: &str, season_number: u32) -> Result<Season>;

    /// Search series whose titles match a partial query.
    ///
    /// Returns [`sr_core::Error::NotFound`] when nothing matches.
    async fn search_series(&self, query: &str) -> Result<Vec<Suggestion>>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
