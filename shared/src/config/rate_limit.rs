//! Rate limiting configuration module
//!
//! Defines the window/threshold pairs for the six named request policies.
//! The `lockout` policy is fixed by contract at one request per hour and
//! `auth` at five per fifteen minutes; the others are tunable per
//! deployment.

use serde::{Deserialize, Serialize};

const MINUTE_MS: u64 = 60 * 1_000;

/// Window/threshold pair for one named rate-limit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicySettings {
    /// Maximum number of requests allowed within the window
    pub max_requests: u32,

    /// Window length in milliseconds
    pub window_ms: u64,
}

impl PolicySettings {
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// Rate limiting configuration covering all named policies
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Master switch; when disabled every check is allowed
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// General API traffic
    #[serde(default = "default_general")]
    pub general: PolicySettings,

    /// Login and credential submission
    #[serde(default = "default_auth")]
    pub auth: PolicySettings,

    /// Two-factor verification endpoints
    #[serde(default = "default_two_factor")]
    pub two_factor: PolicySettings,

    /// SMS code issuance
    #[serde(default = "default_sms")]
    pub sms: PolicySettings,

    /// Password reset requests
    #[serde(default = "default_password_reset")]
    pub password_reset: PolicySettings,

    /// Account lockout escalation
    #[serde(default = "default_lockout")]
    pub lockout: PolicySettings,
}

fn default_enabled() -> bool {
    true
}

fn default_general() -> PolicySettings {
    PolicySettings::new(100, 15 * MINUTE_MS)
}

fn default_auth() -> PolicySettings {
    PolicySettings::new(5, 15 * MINUTE_MS)
}

fn default_two_factor() -> PolicySettings {
    PolicySettings::new(10, 15 * MINUTE_MS)
}

fn default_sms() -> PolicySettings {
    PolicySettings::new(5, 60 * MINUTE_MS)
}

fn default_password_reset() -> PolicySettings {
    PolicySettings::new(3, 60 * MINUTE_MS)
}

fn default_lockout() -> PolicySettings {
    PolicySettings::new(1, 60 * MINUTE_MS)
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            general: default_general(),
            auth: default_auth(),
            two_factor: default_two_factor(),
            sms: default_sms(),
            password_reset: default_password_reset(),
            lockout: default_lockout(),
        }
    }
}

impl RateLimitConfig {
    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            general: PolicySettings::new(1_000, 15 * MINUTE_MS),
            auth: PolicySettings::new(50, 15 * MINUTE_MS),
            two_factor: PolicySettings::new(100, 15 * MINUTE_MS),
            sms: PolicySettings::new(50, 60 * MINUTE_MS),
            password_reset: PolicySettings::new(30, 60 * MINUTE_MS),
            ..Default::default()
        }
    }

    /// Contractual limits for production deployments
    pub fn production() -> Self {
        Self::default()
    }
}
