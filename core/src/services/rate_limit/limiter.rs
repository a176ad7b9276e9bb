//! Request rate limiter over named policy scopes.
//!
//! Every check resolves a scope to its configured window/threshold pair,
//! counts the hit in the backing [`CounterStore`] and returns a decision
//! carrying the standard `X-RateLimit-*` header values. Store failures
//! never propagate: a limiter that cannot count lets the request through
//! and logs the fault.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::warn;

use sd_shared::{PolicySettings, RateLimitConfig};

use super::counter_store::CounterStore;

/// Named request classes with independent limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// General API traffic
    General,
    /// Login and credential submission
    Auth,
    /// Two-factor verification endpoints
    TwoFactor,
    /// SMS code issuance
    Sms,
    /// Password reset requests
    PasswordReset,
    /// Account lockout escalation
    Lockout,
}

impl RateLimitScope {
    /// Scope name used in counter keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::General => "general",
            RateLimitScope::Auth => "auth",
            RateLimitScope::TwoFactor => "two_factor",
            RateLimitScope::Sms => "sms",
            RateLimitScope::PasswordReset => "password_reset",
            RateLimitScope::Lockout => "lockout",
        }
    }

    /// Resolve the configured window/threshold pair for this scope
    pub fn settings(&self, config: &RateLimitConfig) -> PolicySettings {
        match self {
            RateLimitScope::General => config.general,
            RateLimitScope::Auth => config.auth,
            RateLimitScope::TwoFactor => config.two_factor,
            RateLimitScope::Sms => config.sms,
            RateLimitScope::PasswordReset => config.password_reset,
            RateLimitScope::Lockout => config.lockout,
        }
    }
}

impl std::fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a rate limit check, ready to render as response headers
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Policy maximum for the scope
    pub limit: u32,

    /// Requests left in the current window
    pub remaining: u32,

    /// When the current window rolls over
    pub reset_at: DateTime<Utc>,

    /// Seconds until the caller should retry; set only when denied
    pub retry_after_seconds: Option<u64>,
}

impl RateLimitDecision {
    /// Render the decision as HTTP header name/value pairs
    ///
    /// Always includes `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
    /// `X-RateLimit-Reset` (epoch seconds). Denied decisions also carry
    /// `Retry-After`.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("X-RateLimit-Limit", self.limit.to_string()),
            ("X-RateLimit-Remaining", self.remaining.to_string()),
            ("X-RateLimit-Reset", self.reset_at.timestamp().to_string()),
        ];
        if let Some(retry_after) = self.retry_after_seconds {
            headers.push(("Retry-After", retry_after.to_string()));
        }
        headers
    }
}

/// Rate limiter enforcing the six named policies
///
/// Checks, blocks and resets are all infallible from the caller's point
/// of view. When the backing store errors the limiter fails open.
pub struct RateLimiterService<S>
where
    S: CounterStore,
{
    store: Arc<S>,
    config: RateLimitConfig,
}

impl<S> RateLimiterService<S>
where
    S: CounterStore,
{
    /// Create a new rate limiter over the given store
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Count one request from `identity` under `scope` and decide it
    ///
    /// # Arguments
    /// * `scope` - Which policy applies
    /// * `identity` - Caller identity, typically an IP address or user ID
    pub async fn check(&self, scope: RateLimitScope, identity: &str) -> RateLimitDecision {
        let settings = scope.settings(&self.config);

        if !self.config.enabled {
            return Self::open_decision(settings);
        }

        let key = Self::counter_key(scope, identity);
        match self.store.check(&key, settings).await {
            Ok(decision) => {
                let now = Utc::now();
                let retry_after_seconds = if decision.blocked {
                    let seconds = (decision.reset_at - now).num_seconds().max(1);
                    Some(seconds as u64)
                } else {
                    None
                };

                if decision.blocked {
                    warn!(
                        scope = %scope,
                        identity,
                        count = decision.count,
                        limit = settings.max_requests,
                        "rate limit exceeded"
                    );
                }

                RateLimitDecision {
                    allowed: !decision.blocked,
                    limit: settings.max_requests,
                    remaining: decision.remaining,
                    reset_at: decision.reset_at,
                    retry_after_seconds,
                }
            }
            Err(error) => {
                warn!(scope = %scope, identity, %error, "rate limit store unavailable, allowing request");
                Self::open_decision(settings)
            }
        }
    }

    /// Block `identity` in `scope` for `duration`
    ///
    /// Defaults to twice the scope window when no duration is given.
    /// Store failures are logged and swallowed.
    pub async fn block(&self, scope: RateLimitScope, identity: &str, duration: Option<Duration>) {
        let settings = scope.settings(&self.config);
        let duration =
            duration.unwrap_or_else(|| Duration::milliseconds((settings.window_ms * 2) as i64));

        let key = Self::counter_key(scope, identity);
        if let Err(error) = self.store.block(&key, duration).await {
            warn!(scope = %scope, identity, %error, "failed to block identity");
        }
    }

    /// Clear all counter state for `identity` in `scope`
    pub async fn reset(&self, scope: RateLimitScope, identity: &str) {
        let key = Self::counter_key(scope, identity);
        if let Err(error) = self.store.reset(&key).await {
            warn!(scope = %scope, identity, %error, "failed to reset rate limit");
        }
    }

    /// Drop counters whose windows have rolled over
    ///
    /// # Returns
    /// * Number of counters removed; zero when the store errors
    pub async fn purge_expired(&self) -> usize {
        match self.store.purge_expired().await {
            Ok(purged) => purged,
            Err(error) => {
                warn!(%error, "failed to purge expired rate limit counters");
                0
            }
        }
    }

    fn counter_key(scope: RateLimitScope, identity: &str) -> String {
        format!("rl:{}:{}", scope.as_str(), identity)
    }

    /// Permissive decision used when limiting is disabled or the store
    /// cannot be reached. Reported as an untouched window.
    fn open_decision(settings: PolicySettings) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            limit: settings.max_requests,
            remaining: settings.max_requests,
            reset_at: Utc::now() + Duration::milliseconds(settings.window_ms as i64),
            retry_after_seconds: None,
        }
    }
}
