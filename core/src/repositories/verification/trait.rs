//! Verification state repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::verification_state::VerificationState;
use crate::errors::DomainError;

/// Repository trait for short-lived verification state
///
/// Holds the pending SMS code hash and the per-action attempt counters
/// for a user. Implementations may expire records on their own after
/// the verification window has long passed.
#[async_trait]
pub trait VerificationStateRepository: Send + Sync {
    /// Find the verification state for a user
    ///
    /// # Arguments
    /// * `user_id` - The user ID to look up
    ///
    /// # Returns
    /// * `Ok(Some(state))` when the user has pending verification state
    /// * `Ok(None)` when none is stored
    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationState>, DomainError>;

    /// Persist the verification state, replacing any existing record
    ///
    /// # Arguments
    /// * `state` - The state to save
    async fn save(&self, state: &VerificationState) -> Result<(), DomainError>;

    /// Remove the verification state for a user
    ///
    /// # Arguments
    /// * `user_id` - The user whose state is discarded
    async fn delete(&self, user_id: Uuid) -> Result<(), DomainError>;
}
