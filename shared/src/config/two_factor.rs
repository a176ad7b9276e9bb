//! Two-factor authentication configuration module

use serde::{Deserialize, Serialize};

/// Two-factor authentication settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwoFactorConfig {
    /// Issuer name embedded in TOTP provisioning URIs
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Number of digits in a TOTP token
    #[serde(default = "default_totp_digits")]
    pub totp_digits: usize,

    /// TOTP time step in seconds
    #[serde(default = "default_totp_step_seconds")]
    pub totp_step_seconds: u64,

    /// Accepted clock drift in time steps on either side of "now"
    #[serde(default = "default_totp_skew")]
    pub totp_skew: u8,

    /// Number of backup codes issued per batch
    #[serde(default = "default_backup_code_count")]
    pub backup_code_count: usize,

    /// Number of decimal digits per backup code
    #[serde(default = "default_backup_code_length")]
    pub backup_code_length: usize,

    /// SMS one-time-password lifetime in milliseconds
    #[serde(default = "default_sms_otp_ttl_ms")]
    pub sms_otp_ttl_ms: u64,

    /// Maximum verification attempts per action family per window
    #[serde(default = "default_max_action_attempts")]
    pub max_action_attempts: u32,

    /// Attempt-counter window in milliseconds
    #[serde(default = "default_action_window_ms")]
    pub action_window_ms: u64,
}

fn default_issuer() -> String {
    "SchoolDesk".to_string()
}

fn default_totp_digits() -> usize {
    6
}

fn default_totp_step_seconds() -> u64 {
    30
}

fn default_totp_skew() -> u8 {
    2
}

fn default_backup_code_count() -> usize {
    10
}

fn default_backup_code_length() -> usize {
    8
}

fn default_sms_otp_ttl_ms() -> u64 {
    10 * 60 * 1_000
}

fn default_max_action_attempts() -> u32 {
    5
}

fn default_action_window_ms() -> u64 {
    15 * 60 * 1_000
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            totp_digits: default_totp_digits(),
            totp_step_seconds: default_totp_step_seconds(),
            totp_skew: default_totp_skew(),
            backup_code_count: default_backup_code_count(),
            backup_code_length: default_backup_code_length(),
            sms_otp_ttl_ms: default_sms_otp_ttl_ms(),
            max_action_attempts: default_max_action_attempts(),
            action_window_ms: default_action_window_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TwoFactorConfig::default();
        assert_eq!(config.totp_digits, 6);
        assert_eq!(config.totp_step_seconds, 30);
        assert_eq!(config.totp_skew, 2);
        assert_eq!(config.backup_code_count, 10);
        assert_eq!(config.sms_otp_ttl_ms, 600_000);
        assert_eq!(config.max_action_attempts, 5);
        assert_eq!(config.action_window_ms, 900_000);
    }
}
