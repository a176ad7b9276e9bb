//! Unit tests for SMS one-time-password issuance and verification

use std::time::Duration;
use uuid::Uuid;

use sd_shared::TwoFactorConfig;

use crate::domain::entities::audit::{EventContext, SecurityEventKind};
use crate::domain::entities::verification_state::VerificationAction;
use crate::errors::{DomainError, TwoFactorError};

use super::mocks::{fixture, fixture_with_config, TwoFactorFixture};

const PHONE: &str = "+15551234567";

/// Pull the six-digit code out of a dispatched message body
fn code_in(message: &str) -> String {
    message
        .split(|c: char| !c.is_ascii_digit())
        .find(|chunk| chunk.len() == 6)
        .map(str::to_string)
        .unwrap()
}

/// A six-digit code guaranteed to differ from `code`
fn different_code(code: &str) -> String {
    let n: u32 = code.parse().unwrap();
    format!("{:06}", (n + 1) % 1_000_000)
}

async fn send(fixture: &TwoFactorFixture, user_id: Uuid) -> String {
    fixture
        .service
        .send_sms_otp(user_id, PHONE, EventContext::new())
        .await
        .unwrap();
    let messages = fixture.sms.sent_messages();
    code_in(&messages.last().unwrap().1)
}

#[tokio::test]
async fn test_send_stores_hash_and_dispatches_message() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();

    let code = send(&fixture, user_id).await;

    let state = fixture.states.get(user_id).unwrap();
    let stored = state.sms_otp_hash.unwrap();
    assert_ne!(stored, code, "only the hash may be persisted");

    let messages = fixture.sms.sent_messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, PHONE);
    assert!(messages[0].1.contains("SchoolDesk"));
    assert!(messages[0].1.contains("10 minutes"));
}

#[tokio::test]
async fn test_send_event_masks_the_phone_number() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();

    send(&fixture, user_id).await;

    let events = fixture.events.get_all_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, SecurityEventKind::SmsOtpSent);
    assert_eq!(events[0].user_id, Some(user_id));

    let details = events[0].details.as_ref().unwrap();
    assert_eq!(details["phone"], "****4567");
    assert!(!serde_json::to_string(details).unwrap().contains("1555123"));
}

#[tokio::test]
async fn test_delivery_failure_keeps_pending_code_and_records_nothing() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();
    fixture.sms.set_should_fail(true);

    let result = fixture
        .service
        .send_sms_otp(user_id, PHONE, EventContext::new())
        .await;

    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::DeliveryFailure))
    ));
    // The code survives the failed dispatch so a retry can reuse it
    assert!(fixture.states.get(user_id).unwrap().sms_otp_hash.is_some());
    assert!(fixture.events.get_all_events().is_empty());

    // Once the gateway recovers the flow completes normally
    fixture.sms.set_should_fail(false);
    let code = send(&fixture, user_id).await;
    fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_verify_consumes_the_code() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();
    let code = send(&fixture, user_id).await;

    fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await
        .unwrap();

    let state = fixture.states.get(user_id).unwrap();
    assert!(state.sms_otp_hash.is_none());

    let kinds: Vec<String> = fixture
        .events
        .get_all_events()
        .iter()
        .map(|event| event.kind.as_str().to_string())
        .collect();
    assert!(kinds.contains(&"SMS_OTP_SUCCESS".to_string()));

    // A consumed code cannot be replayed
    let replay = fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await;
    assert!(matches!(
        replay,
        Err(DomainError::TwoFactor(TwoFactorError::NoPendingCode))
    ));
}

#[tokio::test]
async fn test_verify_without_pending_code() {
    let fixture = fixture();

    let result = fixture
        .service
        .verify_sms_otp(Uuid::new_v4(), "123456", EventContext::new())
        .await;

    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::NoPendingCode))
    ));
}

#[tokio::test]
async fn test_wrong_code_costs_an_attempt_but_keeps_the_code() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();
    let code = send(&fixture, user_id).await;

    let result = fixture
        .service
        .verify_sms_otp(user_id, &different_code(&code), EventContext::new())
        .await;

    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::InvalidCode))
    ));
    let state = fixture.states.get(user_id).unwrap();
    assert_eq!(state.attempts(VerificationAction::Sms), 1);
    assert!(state.sms_otp_hash.is_some());

    let kinds: Vec<String> = fixture
        .events
        .get_all_events()
        .iter()
        .map(|event| event.kind.as_str().to_string())
        .collect();
    assert!(kinds.contains(&"SMS_OTP_FAILURE".to_string()));

    // The real code still verifies after the miss
    fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_code_is_cleared_on_sight() {
    let config = TwoFactorConfig {
        sms_otp_ttl_ms: 40,
        ..TwoFactorConfig::default()
    };
    let fixture = fixture_with_config(config);
    let user_id = Uuid::new_v4();
    let code = send(&fixture, user_id).await;

    tokio::time::sleep(Duration::from_millis(80)).await;

    let result = fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await;
    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::CodeExpired))
    ));
    assert!(fixture.states.get(user_id).unwrap().sms_otp_hash.is_none());

    let again = fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await;
    assert!(matches!(
        again,
        Err(DomainError::TwoFactor(TwoFactorError::NoPendingCode))
    ));
}

#[tokio::test]
async fn test_reissue_replaces_code_and_resets_attempts() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();
    let first = send(&fixture, user_id).await;

    // Burn one attempt against the first code
    let _ = fixture
        .service
        .verify_sms_otp(user_id, &different_code(&first), EventContext::new())
        .await;
    assert_eq!(
        fixture
            .states
            .get(user_id)
            .unwrap()
            .attempts(VerificationAction::Sms),
        1
    );

    let second = send(&fixture, user_id).await;
    assert_eq!(
        fixture
            .states
            .get(user_id)
            .unwrap()
            .attempts(VerificationAction::Sms),
        0
    );

    let stale = fixture
        .service
        .verify_sms_otp(user_id, &first, EventContext::new())
        .await;
    if first != second {
        assert!(matches!(
            stale,
            Err(DomainError::TwoFactor(TwoFactorError::InvalidCode))
        ));
        fixture
            .service
            .verify_sms_otp(user_id, &second, EventContext::new())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_attempt_budget_locks_out_even_the_right_code() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();
    let code = send(&fixture, user_id).await;

    for _ in 0..5 {
        let result = fixture
            .service
            .verify_sms_otp(user_id, &different_code(&code), EventContext::new())
            .await;
        assert!(matches!(
            result,
            Err(DomainError::TwoFactor(TwoFactorError::InvalidCode))
        ));
    }

    let result = fixture
        .service
        .verify_sms_otp(user_id, &code, EventContext::new())
        .await;
    assert!(matches!(
        result,
        Err(DomainError::TwoFactor(TwoFactorError::RateLimited))
    ));
}
