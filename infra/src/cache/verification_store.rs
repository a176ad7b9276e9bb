//! Redis-backed verification state storage.
//!
//! Stores each user's [`VerificationState`] as a JSON blob under a
//! per-user key. The record carries the pending SMS code hash and the
//! per-action attempt counters; a TTL well past every verification
//! window lets Redis discard abandoned state on its own.

use async_trait::async_trait;
use uuid::Uuid;

use sd_core::domain::entities::verification_state::VerificationState;
use sd_core::errors::DomainError;
use sd_core::repositories::verification::VerificationStateRepository;

use crate::cache::RedisClient;

/// Redis key prefix for verification state
const STATE_KEY_PREFIX: &str = "verification:state";

/// Default record lifetime, one day
const STATE_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Verification state store shared between instances through Redis
pub struct RedisVerificationStateRepository {
    /// Redis client for cache operations
    client: RedisClient,
    /// Record lifetime in seconds
    ttl_seconds: u64,
}

impl RedisVerificationStateRepository {
    /// Create a new store with the default one-day record lifetime
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            ttl_seconds: STATE_TTL_SECONDS,
        }
    }

    /// Override the record lifetime
    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    fn state_key(&self, user_id: Uuid) -> String {
        self.client
            .namespaced_key(&format!("{}:{}", STATE_KEY_PREFIX, user_id))
    }
}

#[async_trait]
impl VerificationStateRepository for RedisVerificationStateRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationState>, DomainError> {
        let raw = self.client.get(&self.state_key(user_id)).await?;

        match raw {
            Some(json) => {
                let state = serde_json::from_str(&json).map_err(|e| DomainError::Internal {
                    message: format!("Invalid verification state JSON: {}", e),
                })?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, state: &VerificationState) -> Result<(), DomainError> {
        let json = serde_json::to_string(state).map_err(|e| DomainError::Internal {
            message: format!("Failed to encode verification state: {}", e),
        })?;

        self.client
            .set_with_expiry(&self.state_key(state.user_id), &json, self.ttl_seconds)
            .await?;

        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), DomainError> {
        self.client.delete(&self.state_key(user_id)).await?;
        Ok(())
    }
}
