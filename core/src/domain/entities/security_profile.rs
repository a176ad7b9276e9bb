//! Per-user security profile entity.
//!
//! Holds the durable two-factor material for one account: the TOTP
//! secret, hashed backup codes, the enabled flag, and the password hash
//! consulted for sensitive changes. Plaintext codes never live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Security profile for one user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSecurityProfile {
    /// The account this profile belongs to
    pub user_id: Uuid,

    /// Password hash used for re-verification on sensitive changes
    pub password_hash: String,

    /// Enrolled phone number for SMS codes, E.164
    pub phone_number: Option<String>,

    /// Whether two-factor authentication is active
    pub two_factor_enabled: bool,

    /// Base32-encoded TOTP secret, present only while enabled
    pub totp_secret: Option<String>,

    /// One-way hashes of unused backup codes
    pub backup_code_hashes: Vec<String>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserSecurityProfile {
    /// Create a profile with two-factor disabled
    pub fn new(user_id: Uuid, password_hash: impl Into<String>) -> Self {
        Self {
            user_id,
            password_hash: password_hash.into(),
            phone_number: None,
            two_factor_enabled: false,
            totp_secret: None,
            backup_code_hashes: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Set the enrolled phone number
    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Activate two-factor with a verified secret and fresh backup-code hashes
    pub fn enable_two_factor(&mut self, totp_secret: String, backup_code_hashes: Vec<String>) {
        self.totp_secret = Some(totp_secret);
        self.backup_code_hashes = backup_code_hashes;
        self.two_factor_enabled = true;
        self.touch();
    }

    /// Deactivate two-factor and wipe all related material
    pub fn disable_two_factor(&mut self) {
        self.two_factor_enabled = false;
        self.totp_secret = None;
        self.backup_code_hashes.clear();
        self.touch();
    }

    /// Replace the backup-code hash set, invalidating all previous codes
    pub fn replace_backup_codes(&mut self, backup_code_hashes: Vec<String>) {
        self.backup_code_hashes = backup_code_hashes;
        self.touch();
    }

    /// Remove one backup-code hash by position, returning it
    ///
    /// Backup codes are single-use; the caller locates the matching
    /// position with a constant-time comparison first.
    pub fn consume_backup_code(&mut self, index: usize) -> Option<String> {
        if index < self.backup_code_hashes.len() {
            let hash = self.backup_code_hashes.remove(index);
            self.touch();
            Some(hash)
        } else {
            None
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
