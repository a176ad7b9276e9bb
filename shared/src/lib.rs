//! Shared utilities and common types for SchoolDesk security services
//!
//! This crate provides functionality used across the security workspace:
//! - Configuration types for rate limiting, two-factor auth, and auditing
//! - Environment detection and logging configuration
//! - Utility functions (phone normalization, validation, masking)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AuditConfig, CacheConfig, DatabaseConfig, Environment, LoggingConfig,
    PolicySettings, RateLimitConfig, SecurityConfig, TwoFactorConfig,
};
pub use utils::phone;
