//! Unified error type for the seasonrank application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`]
//! and a client-safe message via [`Error::public_message`].

/// Phrases that are safe to echo to clients verbatim even when error details
/// are hidden. Provider messages containing one of these pass through.
pub const SAFE_MESSAGES: &[&str] = &[
    "Title not found",
    "Movie not found",
    "Series not found",
    "Please search for a TV series",
    "Invalid IMDb ID",
    "Request limit reached",
];

/// Unified error type covering all failure modes in seasonrank.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request input failed validation. Never reaches the cache or upstream.
    #[error("{0}")]
    Validation(String),

    /// The caller exhausted its quota for the current window.
    #[error("Too many requests. Please try again later.")]
    RateLimited {
        /// Seconds until the current window resets.
        retry_after_secs: u64,
        /// Window reset instant as Unix epoch milliseconds.
        reset_at_ms: i64,
    },

    /// The upstream provider confirmed the entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The entity exists but is not a TV series.
    #[error("Please search for a TV series")]
    WrongMediaType {
        /// The media type the provider reported (e.g. "movie").
        found: String,
    },

    /// Missing credential, transport failure, or a malformed provider response.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for anything uncategorized.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    ///
    /// Only client mistakes and throttling get their own status; every
    /// other failure is a 500 and is told apart by [`Error::code`].
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Validation(_) | Error::WrongMediaType { .. } => 400,
            Error::RateLimited { .. } => 429,
            Error::NotFound(_)
            | Error::UpstreamUnavailable(_)
            | Error::Io { .. }
            | Error::Unexpected(_) => 500,
        }
    }

    /// Machine-readable error kind for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::RateLimited { .. } => "rate_limited",
            Error::NotFound(_) => "not_found",
            Error::WrongMediaType { .. } => "wrong_media_type",
            Error::UpstreamUnavailable(_) => "upstream_unavailable",
            Error::Io { .. } => "io_error",
            Error::Unexpected(_) => "unexpected_error",
        }
    }

    /// Build the message that may be shown to a client.
    ///
    /// With `expose` set (debug mode) the full display text passes through.
    /// Otherwise locally-authored messages pass, provider-originated messages
    /// pass only when they contain a phrase from [`SAFE_MESSAGES`], and
    /// everything else is replaced by `fallback`.
    pub fn public_message(&self, expose: bool, fallback: &str) -> String {
        if expose {
            return self.to_string();
        }

        match self {
            Error::Validation(msg) => msg.clone(),
            Error::RateLimited { .. } | Error::WrongMediaType { .. } => self.to_string(),
            Error::NotFound(msg) | Error::UpstreamUnavailable(msg) | Error::Unexpected(msg)
                if is_safe_message(msg) =>
            {
                msg.clone()
            }
            _ => fallback.to_string(),
        }
    }

    /// Convenience constructor for [`Error::WrongMediaType`].
    pub fn wrong_media_type(found: impl Into<String>) -> Self {
        Error::WrongMediaType {
            found: found.into(),
        }
    }
}

/// Whether `msg` contains one of the allow-listed [`SAFE_MESSAGES`].
pub fn is_safe_message(msg: &str) -> bool {
    SAFE_MESSAGES.iter().any(|safe| msg.contains(safe))
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
