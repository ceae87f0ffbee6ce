//! Per-client fixed-window rate limiting.
//!
//! Each `(quota class, client identity)` pair owns one counter window. The
//! first request opens a window of `window_ms`; requests are admitted until
//! the window holds `max_requests`, and rejected after that until it resets.
//! Bursts straddling a window boundary can therefore reach twice the quota.

use std::collections::HashMap;
use std::fmt;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use sr_core::config::{QuotaConfig, RateLimitsConfig};
use sr_core::Error;

/// Identity shared by every client whose address cannot be determined.
pub const FALLBACK_IDENTITY: &str = "anonymous";

/// Requests left in the current window.
pub static X_RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
/// Window reset instant, Unix epoch milliseconds.
pub static X_RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Independently budgeted request classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuotaClass {
    /// Full series lookups.
    Search,
    /// Autocomplete suggestions.
    Suggest,
}

impl QuotaClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Suggest => "suggest",
        }
    }

    /// Quota configured for this class.
    pub fn quota(&self, config: &RateLimitsConfig) -> QuotaConfig {
        match self {
            Self::Search => config.search,
            Self::Suggest => config.suggest,
        }
    }
}

impl fmt::Display for QuotaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub admitted: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Whole seconds until the window resets; only set on rejection.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitDecision {
    /// Convert a rejection into [`Error::RateLimited`].
    pub fn into_result(self) -> sr_core::Result<Self> {
        if self.admitted {
            Ok(self)
        } else {
            Err(Error::RateLimited {
                retry_after_secs: self.retry_after_secs.unwrap_or(1),
                reset_at_ms: self.reset_at.timestamp_millis(),
            })
        }
    }

    /// Advertise the remaining budget on a successful response.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_RATE_LIMIT_REMAINING.clone(), HeaderValue::from(self.remaining));
        headers.insert(
            X_RATE_LIMIT_RESET.clone(),
            HeaderValue::from(self.reset_at.timestamp_millis()),
        );
    }
}

#[derive(Debug)]
struct RateWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

#[derive(Debug)]
struct LimiterState {
    windows: HashMap<String, RateWindow>,
    last_cleanup: DateTime<Utc>,
}

/// Thread-safe fixed-window limiter for all quota classes.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
    cleanup_interval: TimeDelta,
}

impl RateLimiter {
    /// Create a limiter that sweeps expired windows at most once per
    /// `cleanup_interval_ms`.
    pub fn new(cleanup_interval_ms: u64) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                windows: HashMap::new(),
                last_cleanup: Utc::now(),
            }),
            cleanup_interval: millis(cleanup_interval_ms),
        }
    }

    /// Check and count a request from `identity` against `class`.
    pub fn check(&self, class: QuotaClass, identity: &str, quota: QuotaConfig) -> RateLimitDecision {
        self.check_at(class, identity, quota, Utc::now())
    }

    /// Check and count a request as of `now`.
    pub fn check_at(
        &self,
        class: QuotaClass,
        identity: &str,
        quota: QuotaConfig,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut state = self.state.lock();
        Self::cleanup_expired(&mut state, now, self.cleanup_interval);

        let key = format!("{class}:{identity}");

        match state.windows.get_mut(&key) {
            Some(window) if now <= window.reset_at => {
                if window.count >= quota.max_requests {
                    let retry_after_secs = retry_after(window.reset_at, now);
                    tracing::warn!(
                        class = %class,
                        identity,
                        retry_after_secs,
                        "Rate limit exceeded"
                    );
                    return RateLimitDecision {
                        admitted: false,
                        remaining: 0,
                        reset_at: window.reset_at,
                        retry_after_secs: Some(retry_after_secs),
                    };
                }

                window.count += 1;
                RateLimitDecision {
                    admitted: true,
                    remaining: quota.max_requests - window.count,
                    reset_at: window.reset_at,
                    retry_after_secs: None,
                }
            }
            _ => {
                let reset_at = now
                    .checked_add_signed(millis(quota.window_ms))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);

                if quota.max_requests == 0 {
                    return RateLimitDecision {
                        admitted: false,
                        remaining: 0,
                        reset_at,
                        retry_after_secs: Some(retry_after(reset_at, now)),
                    };
                }

                state.windows.insert(key, RateWindow { count: 1, reset_at });
                RateLimitDecision {
                    admitted: true,
                    remaining: quota.max_requests - 1,
                    reset_at,
                    retry_after_secs: None,
                }
            }
        }
    }

    /// Number of windows currently held in memory.
    pub fn tracked_windows(&self) -> usize {
        self.state.lock().windows.len()
    }

    fn cleanup_expired(state: &mut LimiterState, now: DateTime<Utc>, interval: TimeDelta) {
        if now.signed_duration_since(state.last_cleanup) < interval {
            return;
        }
        state.last_cleanup = now;

        let before = state.windows.len();
        state.windows.retain(|_, window| now <= window.reset_at);
        let removed = before - state.windows.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept expired rate-limit windows");
        }
    }
}

fn millis(ms: u64) -> TimeDelta {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}

/// Seconds until `reset_at`, rounded up, never less than one.
fn retry_after(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = reset_at.signed_duration_since(now).num_milliseconds().max(0);
    let secs = u64::try_from(ms).unwrap_or(0).div_ceil(1000);
    secs.max(1)
}

/// Resolve the client identity used for rate limiting.
///
/// Prefers the first `X-Forwarded-For` entry, then `X-Real-IP`, and otherwise
/// returns [`FALLBACK_IDENTITY`], so all untraceable clients share one budget.
pub fn client_identity(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| FALLBACK_IDENTITY.to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SEARCH: QuotaConfig = QuotaConfig::new(20, 60_000);

    #[test]
    fn admits_exactly_max_requests_per_window() {
        let limiter = RateLimiter::new(60_000);
        let now = Utc::now();

        for i in 1..=20 {
            let decision = limiter.check_at(QuotaClass::Search, "1.2.3.4", SEARCH, now);
            assert!(decision.admitted, "request {i} should be admitted");
            assert_eq!(decision.remaining, 20 - i);
        }

        let denied = limiter.check_at(
            QuotaClass::Search,
            "1.2.3.4",
            SEARCH,
            now + TimeDelta::seconds(5),
        );
        assert!(!denied.admitted);
        assert_eq!(denied.remaining, 0);
        assert_eq!(denied.retry_after_secs, Some(55));
    }

    #[test]
    fn twenty_first_request_in_a_minute_gets_positive_retry_after() {
        let limiter = RateLimiter::new(60_000);
        let now = Utc::now();
        for _ in 0..20 {
            limiter.check_at(QuotaClass::Search, "client", SEARCH, now);
        }

        let denied = limiter.check_at(
            QuotaClass::Search,
            "client",
            SEARCH,
            now + TimeDelta::milliseconds(59_999),
        );
        assert!(!denied.admitted);
        assert_eq!(denied.retry_after_secs, Some(1));
        assert!(denied.into_result().is_err());
    }

    #[test]
    fn fresh_budget_after_window_elapses() {
        let limiter = RateLimiter::new(60_000);
        let quota = QuotaConfig::new(2, 1_000);
        let now = Utc::now();

        assert!(limiter.check_at(QuotaClass::Search, "c", quota, now).admitted);
        assert!(limiter.check_at(QuotaClass::Search, "c", quota, now).admitted);
        assert!(!limiter.check_at(QuotaClass::Search, "c", quota, now).admitted);

        let later = now + TimeDelta::milliseconds(1_001);
        let decision = limiter.check_at(QuotaClass::Search, "c", quota, later);
        assert!(decision.admitted);
        assert_eq!(decision.remaining, 1);
        assert_eq!(decision.reset_at, later + TimeDelta::milliseconds(1_000));
    }

    #[test]
    fn classes_do_not_share_counters() {
        let limiter = RateLimiter::new(60_000);
        let quota = QuotaConfig::new(1, 60_000);
        let now = Utc::now();

        assert!(limiter.check_at(QuotaClass::Search, "c", quota, now).admitted);
        assert!(!limiter.check_at(QuotaClass::Search, "c", quota, now).admitted);

        let suggest = limiter.check_at(QuotaClass::Suggest, "c", quota, now);
        assert!(suggest.admitted);
        assert_eq!(suggest.remaining, 0);
    }

    #[test]
    fn identities_do_not_share_counters() {
        let limiter = RateLimiter::new(60_000);
        let quota = QuotaConfig::new(1, 60_000);
        let now = Utc::now();

        assert!(limiter.check_at(QuotaClass::Search, "a", quota, now).admitted);
        assert!(limiter.check_at(QuotaClass::Search, "b", quota, now).admitted);
    }

    #[test]
    fn zero_quota_rejects_everything() {
        let limiter = RateLimiter::new(60_000);
        let decision = limiter.check_at(
            QuotaClass::Search,
            "c",
            QuotaConfig::new(0, 1_000),
            Utc::now(),
        );
        assert!(!decision.admitted);
        assert_eq!(decision.retry_after_secs, Some(1));
    }

    #[test]
    fn cleanup_drops_expired_windows() {
        let limiter = RateLimiter::new(60_000);
        let quota = QuotaConfig::new(5, 1_000);
        let now = Utc::now();

        limiter.check_at(QuotaClass::Search, "one-shot-1", quota, now);
        limiter.check_at(QuotaClass::Search, "one-shot-2", quota, now);
        assert_eq!(limiter.tracked_windows(), 2);

        // Before the sweep interval nothing is removed.
        let soon = now + TimeDelta::seconds(30);
        limiter.check_at(QuotaClass::Suggest, "other", quota, soon);
        assert_eq!(limiter.tracked_windows(), 3);

        // After it, only windows that already passed their reset go away.
        let later = now + TimeDelta::seconds(61);
        limiter.check_at(QuotaClass::Suggest, "fresh", quota, later);
        assert_eq!(limiter.tracked_windows(), 1);
    }

    #[test]
    fn rejection_converts_to_rate_limited_error() {
        let reset_at = Utc::now();
        let decision = RateLimitDecision {
            admitted: false,
            remaining: 0,
            reset_at,
            retry_after_secs: Some(12),
        };
        match decision.into_result() {
            Err(Error::RateLimited {
                retry_after_secs,
                reset_at_ms,
            }) => {
                assert_eq!(retry_after_secs, 12);
                assert_eq!(reset_at_ms, reset_at.timestamp_millis());
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn admitted_decision_sets_budget_headers() {
        let limiter = RateLimiter::new(60_000);
        let decision = limiter.check(QuotaClass::Suggest, "c", QuotaConfig::new(60, 60_000));

        let mut headers = HeaderMap::new();
        decision.apply_headers(&mut headers);
        assert_eq!(headers["x-ratelimit-remaining"], "59");
        assert_eq!(
            headers["x-ratelimit-reset"],
            decision.reset_at.timestamp_millis().to_string().as_str()
        );
    }

    #[test]
    fn identity_prefers_first_forwarded_for_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_identity(&headers), "203.0.113.7");
    }

    #[test]
    fn identity_falls_back_to_real_ip_then_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_identity(&headers), FALLBACK_IDENTITY);

        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_identity(&headers), "198.51.100.2");

        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_identity(&headers), "198.51.100.2");
    }
}
