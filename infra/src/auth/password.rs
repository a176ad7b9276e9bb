//! Bcrypt password hashing and verification.

use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::error;

use sd_core::errors::{DomainError, DomainResult};
use sd_core::services::two_factor::PasswordVerifier;

/// Password verifier backed by bcrypt
///
/// Verification reads the cost from the stored hash, so `cost` only
/// affects hashes this instance produces.
#[derive(Debug, Clone)]
pub struct BcryptPasswordVerifier {
    /// Work factor for newly produced hashes
    cost: u32,
}

impl BcryptPasswordVerifier {
    /// Create a verifier hashing at the bcrypt default cost
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Override the hashing work factor
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password for storage
    pub fn hash_password(&self, password: &str) -> DomainResult<String> {
        hash(password, self.cost).map_err(|e| {
            error!("Failed to hash password: {}", e);
            DomainError::Internal {
                message: "Failed to hash password".to_string(),
            }
        })
    }
}

impl Default for BcryptPasswordVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordVerifier for BcryptPasswordVerifier {
    fn verify(&self, password: &str, password_hash: &str) -> DomainResult<bool> {
        verify(password, password_hash).map_err(|e| {
            error!("Failed to verify password: {}", e);
            DomainError::Internal {
                message: "Failed to verify password".to_string(),
            }
        })
    }
}
