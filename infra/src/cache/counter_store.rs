//! Redis-backed fixed-window counters for the rate limiter.
//!
//! Each logical key maps to two Redis keys: a counter whose TTL is the
//! policy window, and an optional block marker holding the blocked-until
//! timestamp. Redis expiry replaces the sweep needed by process-local
//! stores, so `purge_expired` has nothing to do here. Sharing the store
//! between instances gives every instance the same view of a caller's
//! window.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use sd_core::errors::DomainResult;
use sd_core::services::rate_limit::{CounterDecision, CounterStore};
use sd_shared::PolicySettings;

use crate::cache::RedisClient;

/// Redis key prefix for window counters
const COUNTER_KEY_PREFIX: &str = "ratelimit:count";

/// Redis key prefix for block markers
const BLOCK_KEY_PREFIX: &str = "ratelimit:block";

/// Counter store shared between instances through Redis
pub struct RedisCounterStore {
    /// Redis client for cache operations
    client: RedisClient,
}

impl RedisCounterStore {
    /// Create a new Redis counter store
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn counter_key(&self, key: &str) -> String {
        self.client
            .namespaced_key(&format!("{}:{}", COUNTER_KEY_PREFIX, key))
    }

    fn block_key(&self, key: &str) -> String {
        self.client
            .namespaced_key(&format!("{}:{}", BLOCK_KEY_PREFIX, key))
    }

    /// Policy window in whole seconds, at least one
    ///
    /// Redis expiry has second granularity; sub-second windows round up
    /// so a counter never lives forever.
    fn window_seconds(policy: PolicySettings) -> u64 {
        (policy.window_ms / 1_000).max(1)
    }

    /// Parse a block marker value back into its blocked-until timestamp
    fn parse_block_epoch(raw: &str) -> Option<DateTime<Utc>> {
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
    }

    /// Read the active block marker for a key, clearing stale ones
    async fn active_block(&self, key: &str) -> DomainResult<Option<DateTime<Utc>>> {
        let block_key = self.block_key(key);
        let raw = match self.client.get(&block_key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match Self::parse_block_epoch(&raw) {
            Some(until) if until > Utc::now() => Ok(Some(until)),
            _ => {
                // Unreadable or already elapsed; Redis expiry normally
                // removes these before we see them.
                self.client.delete(&block_key).await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn check(&self, key: &str, policy: PolicySettings) -> DomainResult<CounterDecision> {
        let now = Utc::now();
        let counter_key = self.counter_key(key);

        if let Some(blocked_until) = self.active_block(key).await? {
            // Hits during an explicit block still count, expiring with
            // the block itself.
            let block_secs = (blocked_until - now).num_seconds().max(1) as u64;
            let count = self.client.increment(&counter_key, Some(block_secs)).await?;
            let count = u32::try_from(count).unwrap_or(u32::MAX);

            return Ok(CounterDecision {
                count,
                remaining: policy.max_requests.saturating_sub(count),
                reset_at: blocked_until,
                blocked: true,
            });
        }

        let window_secs = Self::window_seconds(policy);
        let count = self.client.increment(&counter_key, Some(window_secs)).await?;
        let count = u32::try_from(count).unwrap_or(u32::MAX);

        // The counter TTL is the window deadline
        let reset_at = match self.client.ttl(&counter_key).await? {
            Some(seconds) => now + Duration::seconds(seconds),
            None => now + Duration::seconds(window_secs as i64),
        };

        Ok(CounterDecision {
            count,
            remaining: policy.max_requests.saturating_sub(count),
            reset_at,
            blocked: count > policy.max_requests,
        })
    }

    async fn block(&self, key: &str, duration: Duration) -> DomainResult<()> {
        let until = Utc::now() + duration;
        let seconds = duration.num_seconds().max(1) as u64;

        debug!(key, until = %until, "blocking rate limit key");

        self.client
            .set_with_expiry(&self.block_key(key), &until.timestamp().to_string(), seconds)
            .await?;
        // A block replaces any running window
        self.client.delete(&self.counter_key(key)).await?;

        Ok(())
    }

    async fn reset(&self, key: &str) -> DomainResult<()> {
        self.client.delete(&self.counter_key(key)).await?;
        self.client.delete(&self.block_key(key)).await?;
        Ok(())
    }

    async fn purge_expired(&self) -> DomainResult<usize> {
        // Redis reclaims expired keys on its own
        Ok(0)
    }
}
