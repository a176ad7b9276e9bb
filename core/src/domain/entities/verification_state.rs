//! Per-user verification state entity.
//!
//! Tracks the pending SMS one-time password and the three per-action
//! attempt counters (`totp`, `sms`, `backup`). Each counter is paired
//! with its own reset instant; the pair is always updated together, and
//! a counter reads as zero once its window has elapsed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action family for per-action attempt tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationAction {
    /// Authenticator-app token verification
    Totp,
    /// SMS one-time-password verification
    Sms,
    /// Backup-code verification
    Backup,
}

impl VerificationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationAction::Totp => "totp",
            VerificationAction::Sms => "sms",
            VerificationAction::Backup => "backup",
        }
    }
}

impl std::fmt::Display for VerificationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Verification state for one user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationState {
    /// The account this state belongs to
    pub user_id: Uuid,

    /// SHA-256 hash of the pending SMS code, never the plaintext
    pub sms_otp_hash: Option<String>,

    /// Expiry instant of the pending SMS code
    pub sms_otp_expires_at: Option<DateTime<Utc>>,

    /// Failed TOTP attempts in the current window
    pub totp_attempts: u32,

    /// Instant the TOTP attempt window elapses
    pub totp_attempts_reset_at: DateTime<Utc>,

    /// Failed SMS attempts in the current window
    pub sms_attempts: u32,

    /// Instant the SMS attempt window elapses
    pub sms_attempts_reset_at: DateTime<Utc>,

    /// Failed backup-code attempts in the current window
    pub backup_attempts: u32,

    /// Instant the backup attempt window elapses
    pub backup_attempts_reset_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl VerificationState {
    /// Create empty state with all counters at zero
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            sms_otp_hash: None,
            sms_otp_expires_at: None,
            totp_attempts: 0,
            totp_attempts_reset_at: now,
            sms_attempts: 0,
            sms_attempts_reset_at: now,
            backup_attempts: 0,
            backup_attempts_reset_at: now,
            updated_at: now,
        }
    }

    /// Store a pending SMS code hash and restart the SMS attempt counter
    pub fn set_sms_otp(&mut self, otp_hash: String, ttl: Duration) {
        let now = Utc::now();
        self.sms_otp_hash = Some(otp_hash);
        self.sms_otp_expires_at = Some(now + ttl);
        self.sms_attempts = 0;
        self.sms_attempts_reset_at = now;
        self.updated_at = now;
    }

    /// Drop the pending SMS code and its attempt count
    pub fn clear_sms_otp(&mut self) {
        let now = Utc::now();
        self.sms_otp_hash = None;
        self.sms_otp_expires_at = None;
        self.sms_attempts = 0;
        self.sms_attempts_reset_at = now;
        self.updated_at = now;
    }

    /// Whether the pending SMS code has outlived its expiry
    pub fn is_sms_otp_expired(&self) -> bool {
        match self.sms_otp_expires_at {
            Some(expires_at) => Utc::now() > expires_at,
            None => false,
        }
    }

    /// Attempts in the current window for an action family
    ///
    /// Reads as zero once the window has elapsed; the stored counter is
    /// rolled lazily by the next [`record_failed_attempt`].
    ///
    /// [`record_failed_attempt`]: Self::record_failed_attempt
    pub fn attempts(&self, action: VerificationAction) -> u32 {
        let (attempts, reset_at) = self.counter(action);
        if Utc::now() > reset_at {
            0
        } else {
            attempts
        }
    }

    /// Instant the attempt window for an action family elapses
    pub fn attempts_reset_at(&self, action: VerificationAction) -> DateTime<Utc> {
        self.counter(action).1
    }

    /// Record one failed attempt, rolling the window when it has elapsed
    pub fn record_failed_attempt(&mut self, action: VerificationAction, window: Duration) {
        let now = Utc::now();
        let (attempts, reset_at) = self.counter(action);
        let (new_attempts, new_reset_at) = if now > reset_at {
            (1, now + window)
        } else {
            (attempts + 1, reset_at)
        };
        self.set_counter(action, new_attempts, new_reset_at);
        self.updated_at = now;
    }

    /// Remaining attempts before the action family is rate limited
    pub fn remaining_attempts(&self, action: VerificationAction, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts(action))
    }

    /// Whether the action family has exhausted its attempt budget
    pub fn is_rate_limited(&self, action: VerificationAction, max_attempts: u32) -> bool {
        self.attempts(action) >= max_attempts
    }

    fn counter(&self, action: VerificationAction) -> (u32, DateTime<Utc>) {
        match action {
            VerificationAction::Totp => (self.totp_attempts, self.totp_attempts_reset_at),
            VerificationAction::Sms => (self.sms_attempts, self.sms_attempts_reset_at),
            VerificationAction::Backup => (self.backup_attempts, self.backup_attempts_reset_at),
        }
    }

    fn set_counter(&mut self, action: VerificationAction, attempts: u32, reset_at: DateTime<Utc>) {
        match action {
            VerificationAction::Totp => {
                self.totp_attempts = attempts;
                self.totp_attempts_reset_at = reset_at;
            }
            VerificationAction::Sms => {
                self.sms_attempts = attempts;
                self.sms_attempts_reset_at = reset_at;
            }
            VerificationAction::Backup => {
                self.backup_attempts = attempts;
                self.backup_attempts_reset_at = reset_at;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Duration {
        Duration::minutes(15)
    }

    fn state() -> VerificationState {
        VerificationState::new(Uuid::new_v4())
    }

    #[test]
    fn test_new_state_has_no_pending_code() {
        let state = state();
        assert!(state.sms_otp_hash.is_none());
        assert!(!state.is_sms_otp_expired());
        assert_eq!(state.attempts(VerificationAction::Sms), 0);
    }

    #[test]
    fn test_set_sms_otp_resets_attempts() {
        let mut state = state();
        state.record_failed_attempt(VerificationAction::Sms, window());
        state.record_failed_attempt(VerificationAction::Sms, window());
        assert_eq!(state.attempts(VerificationAction::Sms), 2);

        state.set_sms_otp("hash".to_string(), Duration::minutes(10));
        assert_eq!(state.attempts(VerificationAction::Sms), 0);
        assert!(state.sms_otp_expires_at.is_some());
    }

    #[test]
    fn test_expired_otp_detection() {
        let mut state = state();
        state.set_sms_otp("hash".to_string(), Duration::minutes(10));
        assert!(!state.is_sms_otp_expired());

        state.sms_otp_expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(state.is_sms_otp_expired());
    }

    #[test]
    fn test_counters_are_independent() {
        let mut state = state();
        state.record_failed_attempt(VerificationAction::Totp, window());
        state.record_failed_attempt(VerificationAction::Totp, window());
        state.record_failed_attempt(VerificationAction::Backup, window());

        assert_eq!(state.attempts(VerificationAction::Totp), 2);
        assert_eq!(state.attempts(VerificationAction::Backup), 1);
        assert_eq!(state.attempts(VerificationAction::Sms), 0);
    }

    #[test]
    fn test_rate_limit_threshold() {
        let mut state = state();
        for _ in 0..4 {
            state.record_failed_attempt(VerificationAction::Totp, window());
        }
        assert!(!state.is_rate_limited(VerificationAction::Totp, 5));
        assert_eq!(state.remaining_attempts(VerificationAction::Totp, 5), 1);

        state.record_failed_attempt(VerificationAction::Totp, window());
        assert!(state.is_rate_limited(VerificationAction::Totp, 5));
        assert_eq!(state.remaining_attempts(VerificationAction::Totp, 5), 0);
    }

    #[test]
    fn test_elapsed_window_reads_as_zero_and_rolls() {
        let mut state = state();
        for _ in 0..5 {
            state.record_failed_attempt(VerificationAction::Sms, window());
        }
        assert!(state.is_rate_limited(VerificationAction::Sms, 5));

        // Simulate the window elapsing
        state.sms_attempts_reset_at = Utc::now() - Duration::seconds(1);
        assert_eq!(state.attempts(VerificationAction::Sms), 0);
        assert!(!state.is_rate_limited(VerificationAction::Sms, 5));

        // The next failure starts a fresh window at one
        state.record_failed_attempt(VerificationAction::Sms, window());
        assert_eq!(state.attempts(VerificationAction::Sms), 1);
        assert!(state.sms_attempts_reset_at > Utc::now());
    }

    #[test]
    fn test_counter_and_reset_move_together() {
        let mut state = state();
        let before = state.totp_attempts_reset_at;
        state.totp_attempts_reset_at = Utc::now() - Duration::seconds(1);
        state.record_failed_attempt(VerificationAction::Totp, window());

        assert_eq!(state.totp_attempts, 1);
        assert!(state.totp_attempts_reset_at > before);
    }
}
