//! Cache module for Redis-based storage
//!
//! Provides the Redis client with connection retry logic plus the two
//! adapters built on it: shared rate-limit counters and short-lived
//! verification state.

pub mod counter_store;
pub mod redis_client;
pub mod verification_store;

pub use counter_store::RedisCounterStore;
pub use redis_client::RedisClient;
pub use verification_store::RedisVerificationStateRepository;

// Re-export commonly used types
pub use sd_shared::config::cache::CacheConfig;
