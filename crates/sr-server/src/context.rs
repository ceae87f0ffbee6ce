//! Service-oriented application context.
//!
//! [`AppContext`] is the central struct shared across all route handlers via
//! Axum state. The response cache and the rate limiter are long-lived
//! service objects built once at startup and reached only through here.

use std::sync::Arc;

use sr_core::config::Config;

use crate::cache::SharedCache;
use crate::omdb::OmdbClient;
use crate::provider::SeriesProvider;
use crate::rate_limit::RateLimiter;

/// Application context shared by all request handlers (via Axum state).
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Upstream series data source.
    pub provider: Arc<dyn SeriesProvider>,
    /// Read-through cache in front of the provider.
    pub cache: Arc<SharedCache>,
    /// Per-client request quotas.
    pub limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Build a context around an existing provider.
    pub fn new(config: Config, provider: Arc<dyn SeriesProvider>) -> Self {
        let cache = Arc::new(SharedCache::from_config(&config.cache));
        let limiter = Arc::new(RateLimiter::new(config.rate_limits.cleanup_interval_ms));
        Self {
            config: Arc::new(config),
            provider,
            cache,
            limiter,
        }
    }

    /// Build a context backed by the OMDb client described in `config`.
    pub fn from_config(config: Config) -> sr_core::Result<Self> {
        let provider: Arc<dyn SeriesProvider> = Arc::new(OmdbClient::new(&config.omdb)?);
        Ok(Self::new(config, provider))
    }
}
