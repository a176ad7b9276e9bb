//! Example demonstrating the Redis-backed rate limiter usage
//!
//! Requires a running Redis instance on localhost:6379.
//! Run with: cargo run --example rate_limiter_demo

use std::sync::Arc;

use sd_core::services::rate_limit::{RateLimitScope, RateLimiterService};
use sd_infra::cache::{RedisClient, RedisCounterStore};
use sd_infra::config::SmsConfig;
use sd_infra::sms::create_sms_sender;
use sd_shared::config::cache::CacheConfig;
use sd_shared::config::rate_limit::RateLimitConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Create Redis client and the shared counter store
    let cache_config = CacheConfig::new("redis://localhost:6379");
    let redis_client = RedisClient::new(cache_config).await?;
    let store = Arc::new(RedisCounterStore::new(redis_client));

    let limiter = RateLimiterService::new(store, RateLimitConfig::default());

    // Test the login policy: five attempts per window
    let ip = "192.168.1.100";
    println!("\n=== Testing Login Rate Limiting ===");

    // Reset any existing state
    limiter.reset(RateLimitScope::Auth, ip).await;

    for i in 1..=5 {
        let decision = limiter.check(RateLimitScope::Auth, ip).await;
        println!(
            "Request {}: allowed = {}, remaining = {}/{}",
            i, decision.allowed, decision.remaining, decision.limit
        );
    }

    // Sixth request should be denied
    println!("\nAttempting 6th request (should be denied):");
    let decision = limiter.check(RateLimitScope::Auth, ip).await;
    match decision.retry_after_seconds {
        Some(retry_after) => println!("Denied as expected! Retry after {} seconds", retry_after),
        None => println!("Unexpected: request was allowed"),
    }
    println!("Response headers:");
    for (name, value) in decision.headers() {
        println!("  {}: {}", name, value);
    }

    // Test an explicit block
    let phone = "+14155552671";
    println!("\n=== Testing Explicit Block ===");

    limiter.reset(RateLimitScope::Sms, phone).await;
    limiter.block(RateLimitScope::Sms, phone, None).await;

    let decision = limiter.check(RateLimitScope::Sms, phone).await;
    println!(
        "After block: allowed = {}, retry after = {:?}s",
        decision.allowed, decision.retry_after_seconds
    );

    // Deliver a code through the configured SMS sender
    println!("\n=== Testing SMS Delivery ===");
    let sms_config = SmsConfig {
        provider: "mock".to_string(),
        from_number: "+15550100000".to_string(),
    };
    let sender = create_sms_sender(&sms_config);
    sender.send(phone, "Your SchoolDesk verification code is 123456.").await?;

    // Clean up
    println!("\n=== Cleaning up ===");
    limiter.reset(RateLimitScope::Auth, ip).await;
    limiter.reset(RateLimitScope::Sms, phone).await;
    println!("All rate limits reset.");

    Ok(())
}
