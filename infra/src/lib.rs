//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the SchoolDesk
//! account-security services. It provides the concrete storage and
//! delivery implementations behind the `sd_core` traits.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL repositories using SQLx
//! - **Cache**: Redis client, rate-limit counters, verification state
//! - **SMS**: Mock SMS sender for development and tests
//! - **Auth**: Bcrypt password verification
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis support (default)
//! - `mock-services`: Enable extra mock implementations for testing

// Re-export core error types for convenience
pub use sd_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and adapters
#[cfg(feature = "redis-cache")]
pub mod cache;

/// SMS delivery module
pub mod sms;

/// Authentication primitives
pub mod auth;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services
    //!
    //! Handles database connection strings, Redis settings and SMS
    //! delivery settings, loaded from the process environment.

    use sd_shared::{CacheConfig, DatabaseConfig};
    use serde::{Deserialize, Serialize};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Database configuration
        pub database: DatabaseConfig,
        /// Redis cache configuration
        pub cache: CacheConfig,
        /// SMS delivery configuration
        pub sms: SmsConfig,
    }

    /// SMS delivery configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SmsConfig {
        /// Delivery provider ("mock" is the only built-in)
        pub provider: String,
        /// Sender phone number shown to recipients
        pub from_number: String,
    }

    impl Default for InfrastructureConfig {
        fn default() -> Self {
            Self {
                database: DatabaseConfig::default(),
                cache: CacheConfig::default(),
                sms: SmsConfig {
                    provider: "mock".to_string(),
                    from_number: "+15550100000".to_string(),
                },
            }
        }
    }

    /// Load infrastructure configuration from the environment
    pub fn load() -> InfrastructureConfig {
        dotenvy::dotenv().ok(); // Load .env file if present

        let database = DatabaseConfig::from_env();
        let cache = CacheConfig::from_env();
        let sms = SmsConfig {
            provider: std::env::var("SMS_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
            from_number: std::env::var("SMS_FROM_NUMBER")
                .unwrap_or_else(|_| "+15550100000".to_string()),
        };

        InfrastructureConfig {
            database,
            cache,
            sms,
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS delivery error
    #[error("SMS error: {0}")]
    Sms(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for sd_core::errors::DomainError {
    /// Collapse infrastructure faults into an opaque domain error at
    /// the repository boundary; callers above never see sqlx or redis.
    fn from(error: InfrastructureError) -> Self {
        sd_core::errors::DomainError::Internal {
            message: error.to_string(),
        }
    }
}
