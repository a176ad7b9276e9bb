//! Security event entity and event-kind definitions.
//!
//! Every security-relevant action in the platform is recorded as a
//! [`SecurityEvent`]. The kind set is an open tagged union: the named
//! kinds cover the built-in flows, and [`SecurityEventKind::Other`]
//! carries anything downstream features invent without a schema change.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Kind of security event being recorded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecurityEventKind {
    /// Successful login
    LoginSuccess,
    /// Failed login attempt
    LoginFailure,
    /// Two-factor authentication enabled on an account
    TwoFactorEnabled,
    /// Two-factor authentication disabled on an account
    TwoFactorDisabled,
    /// Successful two-factor verification
    TwoFactorSuccess,
    /// Failed two-factor verification
    TwoFactorFailure,
    /// A backup code was consumed
    BackupCodeUsed,
    /// An SMS one-time password was issued
    SmsOtpSent,
    /// Successful SMS one-time password verification
    SmsOtpSuccess,
    /// Failed SMS one-time password verification
    SmsOtpFailure,
    /// A request was denied by the rate limiter
    RateLimitExceeded,
    /// An account was locked
    AccountLocked,
    /// An account password was changed
    PasswordChanged,
    /// The anomaly detector flagged a pattern
    SuspiciousActivity,
    /// Any event kind outside the predefined set
    Other(String),
}

impl SecurityEventKind {
    /// Get the canonical string representation of the event kind
    pub fn as_str(&self) -> &str {
        match self {
            SecurityEventKind::LoginSuccess => "LOGIN_SUCCESS",
            SecurityEventKind::LoginFailure => "LOGIN_FAILURE",
            SecurityEventKind::TwoFactorEnabled => "TWO_FACTOR_ENABLED",
            SecurityEventKind::TwoFactorDisabled => "TWO_FACTOR_DISABLED",
            SecurityEventKind::TwoFactorSuccess => "TWO_FACTOR_SUCCESS",
            SecurityEventKind::TwoFactorFailure => "TWO_FACTOR_FAILURE",
            SecurityEventKind::BackupCodeUsed => "BACKUP_CODE_USED",
            SecurityEventKind::SmsOtpSent => "SMS_OTP_SENT",
            SecurityEventKind::SmsOtpSuccess => "SMS_OTP_SUCCESS",
            SecurityEventKind::SmsOtpFailure => "SMS_OTP_FAILURE",
            SecurityEventKind::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            SecurityEventKind::AccountLocked => "ACCOUNT_LOCKED",
            SecurityEventKind::PasswordChanged => "PASSWORD_CHANGED",
            SecurityEventKind::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
            SecurityEventKind::Other(name) => name,
        }
    }

    /// Parse an event kind from its string representation
    ///
    /// Unknown strings become [`SecurityEventKind::Other`], so parsing
    /// is total and stored events written by newer code always load.
    pub fn from_str(s: &str) -> Self {
        match s {
            "LOGIN_SUCCESS" => SecurityEventKind::LoginSuccess,
            "LOGIN_FAILURE" => SecurityEventKind::LoginFailure,
            "TWO_FACTOR_ENABLED" => SecurityEventKind::TwoFactorEnabled,
            "TWO_FACTOR_DISABLED" => SecurityEventKind::TwoFactorDisabled,
            "TWO_FACTOR_SUCCESS" => SecurityEventKind::TwoFactorSuccess,
            "TWO_FACTOR_FAILURE" => SecurityEventKind::TwoFactorFailure,
            "BACKUP_CODE_USED" => SecurityEventKind::BackupCodeUsed,
            "SMS_OTP_SENT" => SecurityEventKind::SmsOtpSent,
            "SMS_OTP_SUCCESS" => SecurityEventKind::SmsOtpSuccess,
            "SMS_OTP_FAILURE" => SecurityEventKind::SmsOtpFailure,
            "RATE_LIMIT_EXCEEDED" => SecurityEventKind::RateLimitExceeded,
            "ACCOUNT_LOCKED" => SecurityEventKind::AccountLocked,
            "PASSWORD_CHANGED" => SecurityEventKind::PasswordChanged,
            "SUSPICIOUS_ACTIVITY" => SecurityEventKind::SuspiciousActivity,
            other => SecurityEventKind::Other(other.to_string()),
        }
    }

    /// Whether this kind represents a failed or denied action
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SecurityEventKind::LoginFailure
                | SecurityEventKind::TwoFactorFailure
                | SecurityEventKind::SmsOtpFailure
                | SecurityEventKind::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for SecurityEventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SecurityEventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(de::Error::custom("event kind must not be empty"));
        }
        Ok(SecurityEventKind::from_str(&s))
    }
}

/// Caller-supplied metadata attached to a recorded event
///
/// Everything here is optional; the audit service copies it verbatim
/// onto the stored event. Phone numbers must be masked before they are
/// placed in `details`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    /// Source IP address of the request
    pub ip_address: Option<String>,

    /// User agent string from the request
    pub user_agent: Option<String>,

    /// Session identifier, when a session exists
    pub session_id: Option<String>,

    /// Client device fingerprint
    pub device_fingerprint: Option<String>,

    /// Coarse geolocation derived from the IP, when available
    pub geolocation: Option<String>,

    /// Short human-readable reason for the event
    pub reason: Option<String>,

    /// Additional structured payload
    pub details: Option<JsonValue>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source IP address
    pub fn with_ip(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    /// Set IP address and user agent together
    pub fn with_request(
        mut self,
        ip_address: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        self.ip_address = Some(ip_address.into());
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the device fingerprint
    pub fn with_device_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.device_fingerprint = Some(fingerprint.into());
        self
    }

    /// Set the geolocation
    pub fn with_geolocation(mut self, geolocation: impl Into<String>) -> Self {
        self.geolocation = Some(geolocation.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a structured payload
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }
}

/// One recorded security event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique identifier for this event
    pub id: Uuid,

    /// What happened
    pub kind: SecurityEventKind,

    /// The user the event concerns, when known
    pub user_id: Option<Uuid>,

    /// Source IP address
    pub ip_address: Option<String>,

    /// User agent string
    pub user_agent: Option<String>,

    /// Session identifier
    pub session_id: Option<String>,

    /// Client device fingerprint
    pub device_fingerprint: Option<String>,

    /// Coarse geolocation
    pub geolocation: Option<String>,

    /// Short human-readable reason
    pub reason: Option<String>,

    /// Additional structured payload
    pub details: Option<JsonValue>,

    /// Server-assigned timestamp
    pub created_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Create a new event with a server-assigned id and timestamp
    pub fn new(kind: SecurityEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            user_id: None,
            ip_address: None,
            user_agent: None,
            session_id: None,
            device_fingerprint: None,
            geolocation: None,
            reason: None,
            details: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the user this event concerns
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Copy caller-supplied metadata onto the event
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.ip_address = context.ip_address;
        self.user_agent = context.user_agent;
        self.session_id = context.session_id;
        self.device_fingerprint = context.device_fingerprint;
        self.geolocation = context.geolocation;
        self.reason = context.reason;
        self.details = context.details;
        self
    }

    /// Whether this event represents a failed or denied action
    pub fn is_failure(&self) -> bool {
        self.kind.is_failure()
    }
}
