//! Delivery and credential seams for the two-factor service.

use async_trait::async_trait;

use crate::errors::DomainResult;

/// Outbound SMS delivery channel
///
/// The service treats delivery as fire-and-forget: a stored one-time
/// password survives a failed dispatch so the user can retry.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Deliver `message` to `phone_number` (E.164)
    async fn send(&self, phone_number: &str, message: &str) -> DomainResult<()>;
}

/// Password hash verification used for sensitive changes
pub trait PasswordVerifier: Send + Sync {
    /// Check a submitted password against a stored hash
    fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool>;
}
