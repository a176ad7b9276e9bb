//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `audit` - Security audit log retention and anomaly detection
//! - `cache` - Redis connection settings
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - The six named request-rate policies
//! - `two_factor` - TOTP, backup-code, and SMS OTP settings

pub mod audit;
pub mod cache;
pub mod database;
pub mod environment;
pub mod rate_limit;
pub mod two_factor;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use audit::AuditConfig;
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LoggingConfig};
pub use rate_limit::{PolicySettings, RateLimitConfig};
pub use two_factor::TwoFactorConfig;

/// Complete security-subsystem configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Two-factor authentication configuration
    #[serde(default)]
    pub two_factor: TwoFactorConfig,

    /// Audit log configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            two_factor: TwoFactorConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl SecurityConfig {
    /// Create configuration for development environments
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            rate_limit: RateLimitConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Create configuration for production deployments
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::from_env().with_max_connections(50),
            cache: CacheConfig::from_env(),
            rate_limit: RateLimitConfig::production(),
            logging: LoggingConfig::for_environment(Environment::Production),
            ..Default::default()
        }
    }

    /// Load configuration for the environment named in process variables
    pub fn from_env() -> Self {
        match Environment::from_env() {
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
            Environment::Development => Self::development(),
        }
    }
}
