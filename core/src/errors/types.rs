//! Domain-specific error types for two-factor authentication
//!
//! Expected authentication failures are typed values, never panics.
//! Presentation layers map these onto user-facing copy; the variants
//! themselves stay message-light.

use thiserror::Error;

/// Two-factor authentication errors
///
/// These cover every rejection the two-factor service can produce,
/// from credential mismatches to per-action attempt budgets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TwoFactorError {
    /// Verification was attempted on an account without two-factor enabled
    #[error("Two-factor authentication is not enabled")]
    NotEnabled,

    /// Submitted TOTP token, SMS code, or backup code did not match
    #[error("Invalid verification code")]
    InvalidCode,

    /// The pending SMS code exists but its lifetime has elapsed
    #[error("Verification code expired")]
    CodeExpired,

    /// No SMS code is pending for this account
    #[error("No verification code found, request a new one")]
    NoPendingCode,

    /// The per-action attempt budget is exhausted for the current window
    #[error("Too many verification attempts, request a new code")]
    RateLimited,

    /// Password re-verification failed during a sensitive change
    #[error("Invalid password")]
    InvalidPassword,

    /// The outbound delivery channel reported a failure
    #[error("Message delivery failed")]
    DeliveryFailure,

    /// Stored two-factor state contradicts itself (e.g. enabled without a secret)
    #[error("Two-factor state inconsistent: {message}")]
    Inconsistent { message: String },
}
