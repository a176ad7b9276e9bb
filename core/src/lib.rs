//! # SchoolDesk Core
//!
//! Core account-security logic for the SchoolDesk backend: domain
//! entities, security services (rate limiting, audit logging, anomaly
//! detection, two-factor authentication), repository interfaces, and
//! error types. Storage adapters and delivery channels live in the
//! infrastructure crate and plug in through the traits defined here.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
