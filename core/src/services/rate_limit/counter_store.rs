//! Fixed-window counters backing the rate limiter.
//!
//! A counter key accumulates hits until its window rolls over. Hitting a
//! key past its policy maximum marks it blocked for the rest of the
//! window; an explicit block extends that state for an arbitrary
//! duration. Stale entries are reclaimed in place on the next hit and in
//! bulk by [`CounterStore::purge_expired`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use sd_shared::PolicySettings;

use crate::errors::DomainResult;

/// Outcome of counting one hit against a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDecision {
    /// Hits recorded in the current window, including this one
    pub count: u32,

    /// Requests left before the key blocks; never negative
    pub remaining: u32,

    /// When the current window rolls over
    pub reset_at: DateTime<Utc>,

    /// Whether the key is blocked for the rest of the window
    pub blocked: bool,
}

impl CounterDecision {
    /// Whether the hit that produced this decision may proceed
    pub fn allowed(&self) -> bool {
        !self.blocked
    }
}

/// Storage abstraction for fixed-window hit counters
///
/// Implementations must keep `count` and the window boundary consistent
/// under concurrent hits to the same key.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Count one hit against `key` under `policy`
    ///
    /// Creates the counter on first hit, rolls the window over when it
    /// has expired, and otherwise increments. The key becomes blocked
    /// once the count exceeds the policy maximum and stays blocked until
    /// the window rolls over.
    async fn check(&self, key: &str, policy: PolicySettings) -> DomainResult<CounterDecision>;

    /// Block `key` outright until `duration` has elapsed
    ///
    /// Replaces any running window for the key.
    async fn block(&self, key: &str, duration: Duration) -> DomainResult<()>;

    /// Forget all state for `key`
    async fn reset(&self, key: &str) -> DomainResult<()>;

    /// Drop every counter whose window has rolled over
    ///
    /// # Returns
    /// * Number of counters removed
    async fn purge_expired(&self) -> DomainResult<usize>;
}

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u32,
    reset_at: DateTime<Utc>,
    blocked: bool,
}

/// Process-local counter store
///
/// Suitable for single-instance deployments and tests. Multi-instance
/// deployments should use a shared store so all instances see the same
/// counters.
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, CounterEntry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live counters, for tests and diagnostics
    pub async fn len(&self) -> usize {
        self.counters.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.counters.lock().await.is_empty()
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn check(&self, key: &str, policy: PolicySettings) -> DomainResult<CounterDecision> {
        let now = Utc::now();
        let window = Duration::milliseconds(policy.window_ms as i64);
        let mut counters = self.counters.lock().await;

        let entry = counters.entry(key.to_string()).or_insert(CounterEntry {
            count: 0,
            reset_at: now + window,
            blocked: false,
        });

        if now > entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
            entry.blocked = false;
        }

        entry.count += 1;
        if entry.count > policy.max_requests {
            entry.blocked = true;
        }

        Ok(CounterDecision {
            count: entry.count,
            remaining: policy.max_requests.saturating_sub(entry.count),
            reset_at: entry.reset_at,
            blocked: entry.blocked,
        })
    }

    async fn block(&self, key: &str, duration: Duration) -> DomainResult<()> {
        let now = Utc::now();
        let mut counters = self.counters.lock().await;
        counters.insert(
            key.to_string(),
            CounterEntry {
                count: 0,
                reset_at: now + duration,
                blocked: true,
            },
        );
        Ok(())
    }

    async fn reset(&self, key: &str) -> DomainResult<()> {
        let mut counters = self.counters.lock().await;
        counters.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> DomainResult<usize> {
        let now = Utc::now();
        let mut counters = self.counters.lock().await;
        let before = counters.len();
        counters.retain(|_, entry| entry.reset_at >= now);
        Ok(before - counters.len())
    }
}
