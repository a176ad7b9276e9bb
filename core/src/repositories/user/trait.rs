//! User security profile repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::security_profile::UserSecurityProfile;
use crate::errors::DomainError;

/// Repository trait for UserSecurityProfile persistence operations
///
/// The profile holds the durable two-factor material for an account:
/// the password hash, the confirmed TOTP secret and the hashed backup
/// codes. Secrets are stored as provided; hashing happens upstream.
#[async_trait]
pub trait UserSecurityRepository: Send + Sync {
    /// Find a security profile by user ID
    ///
    /// # Arguments
    /// * `user_id` - The user ID to look up
    ///
    /// # Returns
    /// * `Ok(Some(profile))` if the user exists
    /// * `Ok(None)` if no profile is stored for the user
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserSecurityProfile>, DomainError>;

    /// Persist a security profile, replacing any existing record
    ///
    /// # Arguments
    /// * `profile` - The profile to save
    async fn save(&self, profile: &UserSecurityProfile) -> Result<(), DomainError>;
}
