//! Two-factor authentication service.
//!
//! Orchestrates TOTP enrollment, backup codes and SMS one-time
//! passwords over the security-profile and verification-state
//! repositories. Every state transition lands in the audit trail;
//! rejected attempts that change no state record no event.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use sd_shared::phone::mask_phone_number;
use sd_shared::TwoFactorConfig;

use crate::domain::entities::audit::{EventContext, SecurityEventKind};
use crate::domain::entities::security_profile::UserSecurityProfile;
use crate::domain::entities::verification_state::{VerificationAction, VerificationState};
use crate::errors::{DomainError, DomainResult, TwoFactorError};
use crate::repositories::{
    SecurityEventRepository, UserSecurityRepository, VerificationStateRepository,
};
use crate::services::audit::SecurityAuditService;

use super::codes;
use super::totp::{qr_code_data_uri, TotpProvider, TotpSecret};
use super::traits::{PasswordVerifier, SmsSender};

/// SMS one-time passwords are always six digits
const SMS_OTP_LENGTH: usize = 6;

/// Attempt budget left for one action family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRateLimit {
    pub action: VerificationAction,

    /// Attempts left in the current window
    pub remaining: u32,

    /// Whether the budget is exhausted
    pub limited: bool,

    /// When the budget replenishes; present only while limited
    pub reset_at: Option<DateTime<Utc>>,
}

/// Service owning two-factor enrollment and verification
pub struct TwoFactorService<U, V, R, S, P>
where
    U: UserSecurityRepository,
    V: VerificationStateRepository,
    R: SecurityEventRepository,
    S: SmsSender,
    P: PasswordVerifier,
{
    users: Arc<U>,
    states: Arc<V>,
    audit: Arc<SecurityAuditService<R>>,
    sms: Arc<S>,
    passwords: Arc<P>,
    totp: TotpProvider,
    config: TwoFactorConfig,
}

impl<U, V, R, S, P> TwoFactorService<U, V, R, S, P>
where
    U: UserSecurityRepository,
    V: VerificationStateRepository,
    R: SecurityEventRepository,
    S: SmsSender,
    P: PasswordVerifier,
{
    pub fn new(
        users: Arc<U>,
        states: Arc<V>,
        audit: Arc<SecurityAuditService<R>>,
        sms: Arc<S>,
        passwords: Arc<P>,
        config: TwoFactorConfig,
    ) -> Self {
        let totp = TotpProvider::new(&config);
        Self {
            users,
            states,
            audit,
            sms,
            passwords,
            totp,
            config,
        }
    }

    /// Generate a fresh pending secret for enrollment
    ///
    /// Stateless: nothing is persisted and nothing is audited until the
    /// user confirms possession through [`enable`].
    ///
    /// [`enable`]: Self::enable
    pub fn generate_secret(&self, account_label: &str) -> DomainResult<TotpSecret> {
        self.totp.generate_secret(account_label)
    }

    /// Render a provisioning URI as a QR code data URI
    pub fn generate_qr_code(&self, otpauth_uri: &str) -> DomainResult<String> {
        qr_code_data_uri(otpauth_uri)
    }

    /// Activate two-factor authentication
    ///
    /// Verifies the submitted token against the pending secret. On
    /// success the secret and a fresh batch of hashed backup codes are
    /// persisted, `TWO_FACTOR_ENABLED` is recorded, and the plaintext
    /// codes are returned. This is the only time they exist outside the
    /// caller's hands.
    ///
    /// # Arguments
    /// * `user_id` - The enrolling account
    /// * `token` - Current TOTP token from the authenticator app
    /// * `pending_secret` - Base32 secret from [`generate_secret`]
    /// * `context` - Request metadata for the audit trail
    ///
    /// # Returns
    /// * The plaintext backup codes, exactly once
    ///
    /// [`generate_secret`]: Self::generate_secret
    pub async fn enable(
        &self,
        user_id: Uuid,
        token: &str,
        pending_secret: &str,
        context: EventContext,
    ) -> DomainResult<Vec<String>> {
        let mut profile = self.load_profile(user_id).await?;

        if !self.totp.verify(pending_secret, token)? {
            return Err(TwoFactorError::InvalidCode.into());
        }

        let plaintext_codes = codes::generate_backup_codes(
            self.config.backup_code_count,
            self.config.backup_code_length,
        );
        let hashes = plaintext_codes
            .iter()
            .map(|code| codes::hash_code(code))
            .collect();

        profile.enable_two_factor(pending_secret.to_string(), hashes);
        self.users.save(&profile).await?;

        self.audit
            .record(Some(user_id), SecurityEventKind::TwoFactorEnabled, context)
            .await;

        Ok(plaintext_codes)
    }

    /// Deactivate two-factor authentication
    ///
    /// Re-verifies the account password, then wipes the secret, the
    /// backup-code hashes and any pending verification state, and
    /// records `TWO_FACTOR_DISABLED`.
    pub async fn disable(
        &self,
        user_id: Uuid,
        password: &str,
        context: EventContext,
    ) -> DomainResult<()> {
        let mut profile = self.load_profile(user_id).await?;

        if !self.passwords.verify(password, &profile.password_hash)? {
            return Err(TwoFactorError::InvalidPassword.into());
        }

        profile.disable_two_factor();
        self.users.save(&profile).await?;
        self.states.delete(user_id).await?;

        self.audit
            .record(Some(user_id), SecurityEventKind::TwoFactorDisabled, context)
            .await;

        Ok(())
    }

    /// Verify a TOTP token or backup code for an enabled account
    ///
    /// # Arguments
    /// * `user_id` - The account being verified
    /// * `token` - The submitted token or backup code
    /// * `is_backup_code` - Selects the backup-code path
    /// * `context` - Request metadata for the audit trail
    pub async fn verify(
        &self,
        user_id: Uuid,
        token: &str,
        is_backup_code: bool,
        context: EventContext,
    ) -> DomainResult<()> {
        let profile = self.load_profile(user_id).await?;
        if !profile.two_factor_enabled {
            return Err(TwoFactorError::NotEnabled.into());
        }

        if is_backup_code {
            self.verify_backup_code(profile, token, context).await
        } else {
            self.verify_totp(&profile, token, context).await
        }
    }

    async fn verify_backup_code(
        &self,
        mut profile: UserSecurityProfile,
        token: &str,
        context: EventContext,
    ) -> DomainResult<()> {
        let user_id = profile.user_id;
        let Some(index) = codes::find_matching_hash(token, &profile.backup_code_hashes) else {
            // A miss changes nothing and is not an audit event; callers
            // feed it into the rate limiter if they want throttling.
            return Err(TwoFactorError::InvalidCode.into());
        };

        profile.consume_backup_code(index);
        self.users.save(&profile).await?;

        self.audit
            .record(Some(user_id), SecurityEventKind::BackupCodeUsed, context)
            .await;

        Ok(())
    }

    async fn verify_totp(
        &self,
        profile: &UserSecurityProfile,
        token: &str,
        context: EventContext,
    ) -> DomainResult<()> {
        let user_id = profile.user_id;
        let Some(secret) = profile.totp_secret.as_deref() else {
            error!(%user_id, "two-factor enabled but no TOTP secret stored");
            return Err(TwoFactorError::Inconsistent {
                message: "two-factor is enabled but no secret is stored".to_string(),
            }
            .into());
        };

        if self.totp.verify(secret, token)? {
            self.audit
                .record(Some(user_id), SecurityEventKind::TwoFactorSuccess, context)
                .await;
            Ok(())
        } else {
            self.audit
                .record(Some(user_id), SecurityEventKind::TwoFactorFailure, context)
                .await;
            Err(TwoFactorError::InvalidCode.into())
        }
    }

    /// Issue an SMS one-time password
    ///
    /// The code hash is persisted before dispatch, so a delivery failure
    /// leaves a valid pending code behind; the caller sees
    /// `DeliveryFailure` and may retry without invalidating it. Issuance
    /// resets the SMS attempt counter and records `SMS_OTP_SENT` with
    /// the phone number masked to its last four digits.
    pub async fn send_sms_otp(
        &self,
        user_id: Uuid,
        phone_number: &str,
        context: EventContext,
    ) -> DomainResult<()> {
        let code = codes::generate_numeric_code(SMS_OTP_LENGTH);

        let mut state = self.load_state(user_id).await?;
        state.set_sms_otp(codes::hash_code(&code), self.sms_otp_ttl());
        self.states.save(&state).await?;

        let message = format!(
            "Your {} verification code is {}. It expires in {} minutes.",
            self.config.issuer,
            code,
            self.config.sms_otp_ttl_ms / 60_000
        );
        if let Err(err) = self.sms.send(phone_number, &message).await {
            warn!(%user_id, error = %err, "SMS OTP delivery failed, pending code kept");
            return Err(TwoFactorError::DeliveryFailure.into());
        }

        let context = context.with_details(json!({ "phone": mask_phone_number(phone_number) }));
        self.audit
            .record(Some(user_id), SecurityEventKind::SmsOtpSent, context)
            .await;

        Ok(())
    }

    /// Verify a submitted SMS one-time password
    ///
    /// Rejections are checked in a fixed order: no pending code, then
    /// expiry, then the attempt budget, then the comparison itself. An
    /// expired code is cleared on sight; a mismatch costs one attempt.
    pub async fn verify_sms_otp(
        &self,
        user_id: Uuid,
        code: &str,
        context: EventContext,
    ) -> DomainResult<()> {
        let Some(mut state) = self.states.find(user_id).await? else {
            return Err(TwoFactorError::NoPendingCode.into());
        };
        let Some(stored_hash) = state.sms_otp_hash.clone() else {
            return Err(TwoFactorError::NoPendingCode.into());
        };

        if state.is_sms_otp_expired() {
            state.clear_sms_otp();
            self.states.save(&state).await?;
            return Err(TwoFactorError::CodeExpired.into());
        }

        if state.is_rate_limited(VerificationAction::Sms, self.config.max_action_attempts) {
            return Err(TwoFactorError::RateLimited.into());
        }

        if codes::code_matches(code, &stored_hash) {
            state.clear_sms_otp();
            self.states.save(&state).await?;
            self.audit
                .record(Some(user_id), SecurityEventKind::SmsOtpSuccess, context)
                .await;
            Ok(())
        } else {
            state.record_failed_attempt(VerificationAction::Sms, self.action_window());
            self.states.save(&state).await?;
            self.audit
                .record(Some(user_id), SecurityEventKind::SmsOtpFailure, context)
                .await;
            Err(TwoFactorError::InvalidCode.into())
        }
    }

    /// Replace the backup-code batch for an enabled account
    ///
    /// Old codes stop working immediately. The new plaintext codes are
    /// returned exactly once and the regeneration lands in the trail.
    pub async fn regenerate_backup_codes(
        &self,
        user_id: Uuid,
        context: EventContext,
    ) -> DomainResult<Vec<String>> {
        let mut profile = self.load_profile(user_id).await?;
        if !profile.two_factor_enabled {
            return Err(TwoFactorError::NotEnabled.into());
        }

        let plaintext_codes = codes::generate_backup_codes(
            self.config.backup_code_count,
            self.config.backup_code_length,
        );
        let hashes = plaintext_codes
            .iter()
            .map(|code| codes::hash_code(code))
            .collect();

        profile.replace_backup_codes(hashes);
        self.users.save(&profile).await?;

        self.audit
            .record(
                Some(user_id),
                SecurityEventKind::Other("BACKUP_CODES_REGENERATED".to_string()),
                context,
            )
            .await;

        Ok(plaintext_codes)
    }

    /// Attempt budget left for one action family
    ///
    /// Reads the verification-state counters; a user with no stored
    /// state has the full budget.
    pub async fn check_rate_limit(
        &self,
        user_id: Uuid,
        action: VerificationAction,
    ) -> DomainResult<ActionRateLimit> {
        let state = self.load_state(user_id).await?;
        let remaining = state.remaining_attempts(action, self.config.max_action_attempts);
        let limited = state.is_rate_limited(action, self.config.max_action_attempts);

        Ok(ActionRateLimit {
            action,
            remaining,
            limited,
            reset_at: limited.then(|| state.attempts_reset_at(action)),
        })
    }

    /// Count one failed attempt against an action family
    ///
    /// The counter and its reset instant move together; a counter whose
    /// window has elapsed restarts at one.
    pub async fn increment_attempts(
        &self,
        user_id: Uuid,
        action: VerificationAction,
    ) -> DomainResult<()> {
        let mut state = self.load_state(user_id).await?;
        state.record_failed_attempt(action, self.action_window());
        self.states.save(&state).await
    }

    async fn load_profile(&self, user_id: Uuid) -> DomainResult<UserSecurityProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("security profile for user {}", user_id),
            })
    }

    async fn load_state(&self, user_id: Uuid) -> DomainResult<VerificationState> {
        Ok(self
            .states
            .find(user_id)
            .await?
            .unwrap_or_else(|| VerificationState::new(user_id)))
    }

    fn action_window(&self) -> Duration {
        Duration::milliseconds(self.config.action_window_ms as i64)
    }

    fn sms_otp_ttl(&self) -> Duration {
        Duration::milliseconds(self.config.sms_otp_ttl_ms as i64)
    }
}
