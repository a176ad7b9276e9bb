//! MySQL implementation of the UserSecurityRepository trait.
//!
//! Persists the durable two-factor material for each account: password
//! hash, confirmed TOTP secret and the hashed backup codes. Backup-code
//! hashes are stored as a JSON array in a TEXT column so the row stays
//! self-contained.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sd_core::domain::entities::security_profile::UserSecurityProfile;
use sd_core::errors::DomainError;
use sd_core::repositories::user::UserSecurityRepository;

/// MySQL implementation of UserSecurityRepository
///
/// Saving is an upsert keyed on `user_id`; the service layer always
/// writes the whole profile back after mutating it.
pub struct MySqlUserSecurityRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserSecurityRepository {
    /// Create a new MySQL user security repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Encode backup-code hashes for the TEXT column
    pub fn encode_backup_codes(hashes: &[String]) -> Result<String, DomainError> {
        serde_json::to_string(hashes)
            .map_err(|e| DomainError::Internal { message: format!("Failed to encode backup codes: {}", e) })
    }

    /// Decode backup-code hashes from the TEXT column
    pub fn decode_backup_codes(raw: &str) -> Result<Vec<String>, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::Internal { message: format!("Invalid backup codes JSON: {}", e) })
    }

    /// Convert database row to UserSecurityProfile entity
    fn row_to_profile(row: &sqlx::mysql::MySqlRow) -> Result<UserSecurityProfile, DomainError> {
        let user_id: String = row.try_get("user_id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get user_id: {}", e) })?;

        let backup_code_hashes: String = row.try_get("backup_code_hashes")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get backup_code_hashes: {}", e) })?;

        Ok(UserSecurityProfile {
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::Internal { message: format!("Invalid user UUID: {}", e) })?,
            password_hash: row.try_get("password_hash")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get password_hash: {}", e) })?,
            phone_number: row.try_get("phone_number")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get phone_number: {}", e) })?,
            two_factor_enabled: row.try_get("two_factor_enabled")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get two_factor_enabled: {}", e) })?,
            totp_secret: row.try_get("totp_secret")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get totp_secret: {}", e) })?,
            backup_code_hashes: Self::decode_backup_codes(&backup_code_hashes)?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get updated_at: {}", e) })?,
        })
    }
}

#[async_trait]
impl UserSecurityRepository for MySqlUserSecurityRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserSecurityProfile>, DomainError> {
        let query = r#"
            SELECT user_id, password_hash, phone_number, two_factor_enabled,
                   totp_secret, backup_code_hashes, updated_at
            FROM user_security_profiles
            WHERE user_id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find security profile: {}", e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, profile: &UserSecurityProfile) -> Result<(), DomainError> {
        let query = r#"
            INSERT INTO user_security_profiles (
                user_id, password_hash, phone_number, two_factor_enabled,
                totp_secret, backup_code_hashes, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                password_hash = VALUES(password_hash),
                phone_number = VALUES(phone_number),
                two_factor_enabled = VALUES(two_factor_enabled),
                totp_secret = VALUES(totp_secret),
                backup_code_hashes = VALUES(backup_code_hashes),
                updated_at = VALUES(updated_at)
        "#;

        sqlx::query(query)
            .bind(profile.user_id.to_string())
            .bind(&profile.password_hash)
            .bind(&profile.phone_number)
            .bind(profile.two_factor_enabled)
            .bind(&profile.totp_secret)
            .bind(Self::encode_backup_codes(&profile.backup_code_hashes)?)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to save security profile: {}", e) })?;

        Ok(())
    }
}
