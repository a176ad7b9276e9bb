//! Security event repository trait defining the interface for audit trail persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::audit::SecurityEvent;
use crate::errors::DomainError;

/// Repository trait for SecurityEvent persistence operations
///
/// This trait defines the contract for the security audit trail.
/// Implementations should handle writes efficiently to avoid blocking
/// authentication flows; callers treat the trail as append-only.
#[async_trait]
pub trait SecurityEventRepository: Send + Sync {
    /// Append a new security event to the trail
    ///
    /// # Arguments
    /// * `event` - The security event to persist
    ///
    /// # Returns
    /// * `Ok(())` on successful insertion
    /// * `Err(DomainError)` if the operation fails
    async fn insert(&self, event: &SecurityEvent) -> Result<(), DomainError>;

    /// Find security events for a user with pagination
    ///
    /// # Arguments
    /// * `user_id` - The user ID to search for
    /// * `limit` - Maximum number of records to return
    /// * `offset` - Number of records to skip
    ///
    /// # Returns
    /// * Events for the user, ordered by created_at descending
    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SecurityEvent>, DomainError>;

    /// Find all security events for a user after a point in time
    ///
    /// # Arguments
    /// * `user_id` - The user ID to search for
    /// * `since` - Only return events created at or after this time
    ///
    /// # Returns
    /// * Events for the user, ordered by created_at descending
    async fn find_by_user_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<SecurityEvent>, DomainError>;

    /// Find security events originating from an IP address
    ///
    /// # Arguments
    /// * `ip_address` - The source IP address to search for
    /// * `since` - Only return events created at or after this time
    /// * `limit` - Maximum number of records to return
    ///
    /// # Returns
    /// * Events from the address, ordered by created_at descending
    async fn find_by_ip_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, DomainError>;

    /// Find all security events after a point in time
    ///
    /// # Arguments
    /// * `since` - Only return events created at or after this time
    ///
    /// # Returns
    /// * Events ordered by created_at descending
    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<SecurityEvent>, DomainError>;

    /// Delete security events older than a cutoff
    ///
    /// # Arguments
    /// * `cutoff` - Events created before this time are removed
    ///
    /// # Returns
    /// * Number of events deleted
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
