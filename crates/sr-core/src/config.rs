//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for the server, the OMDb upstream, the response cache, and the
//! rate-limit quota classes. Every section defaults sensibly so a completely
//! empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::Error;

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub omdb: OmdbConfig,
    pub cache: CacheConfig,
    pub rate_limits: RateLimitsConfig,
    pub suggest: SuggestConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration strictly: a missing or malformed file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Overlay values taken from the process environment.
    ///
    /// A non-empty `OMDB_API_KEY` replaces `omdb.api_key`.
    pub fn apply_env(&mut self) {
        self.apply_api_key(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.omdb.api_key = Some(key);
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.omdb.api_key.is_none() {
            warnings.push(format!(
                "omdb.api_key is not set and {API_KEY_ENV} is empty; lookups will fail"
            ));
        }

        if self.omdb.requests_per_second == 0 {
            warnings.push("omdb.requests_per_second is 0; falling back to 10".into());
        }

        if self.cache.max_entries == 0 {
            warnings.push("cache.max_entries is 0; nothing will be cached".into());
        }

        for (name, quota) in [
            ("search", &self.rate_limits.search),
            ("suggest", &self.rate_limits.suggest),
        ] {
            if quota.max_requests == 0 {
                warnings.push(format!(
                    "rate_limits.{name}.max_requests is 0; every request will be rejected"
                ));
            }
            if quota.window_ms == 0 {
                warnings.push(format!("rate_limits.{name}.window_ms is 0"));
            }
        }

        if self.suggest.max_results == 0 {
            warnings.push("suggest.max_results is 0; suggestions will always be empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Pass internal error text through to clients (development only).
    pub expose_errors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            expose_errors: false,
        }
    }
}

/// OMDb upstream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Outbound request budget towards the provider.
    pub requests_per_second: u32,
    /// Transport-level timeout for a single upstream request.
    pub timeout_secs: u64,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://www.omdbapi.com/".into(),
            requests_per_second: 10,
            timeout_secs: 10,
        }
    }
}

/// Response cache sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl_secs: 24 * 60 * 60,
        }
    }
}

/// A single quota class: at most `max_requests` per `window_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub max_requests: u32,
    pub window_ms: u64,
}

impl QuotaConfig {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// Per-class rate limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    /// Full series lookups.
    pub search: QuotaConfig,
    /// Autocomplete suggestions; looser because clients debounce and cache.
    pub suggest: QuotaConfig,
    /// Minimum spacing between sweeps of expired windows.
    pub cleanup_interval_ms: u64,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            search: QuotaConfig::new(20, 60_000),
            suggest: QuotaConfig::new(60, 60_000),
            cleanup_interval_ms: 60_000,
        }
    }
}

/// Suggestion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub max_results: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self { max_results: 8 }
    }
}
