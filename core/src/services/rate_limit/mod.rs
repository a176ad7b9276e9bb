//! Request rate limiting module
//!
//! This module enforces the platform's request budgets:
//! - Fixed-window counters over pluggable storage
//! - Six named policy scopes with contractual limits
//! - Standard rate-limit response headers
//! - Fail-open behavior when the counter store is unavailable

mod counter_store;
mod limiter;

#[cfg(test)]
mod tests;

pub use counter_store::{CounterDecision, CounterStore, InMemoryCounterStore};
pub use limiter::{RateLimitDecision, RateLimitScope, RateLimiterService};
