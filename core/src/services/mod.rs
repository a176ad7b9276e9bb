//! Business service layer
//!
//! Each service owns one slice of the account-security domain and
//! talks to storage only through the repository traits, so the same
//! logic runs against MySQL, Redis or the in-memory test doubles.

pub mod audit;
pub mod rate_limit;
pub mod two_factor;

pub use audit::{SecurityAuditService, SuspicionHandler};
pub use rate_limit::{RateLimitScope, RateLimiterService};
pub use two_factor::TwoFactorService;
