//! Unit tests for the per-action verification attempt budget

use chrono::Utc;
use std::time::Duration;
use uuid::Uuid;

use sd_shared::TwoFactorConfig;

use crate::domain::entities::verification_state::VerificationAction;

use super::mocks::{fixture, fixture_with_config};

#[tokio::test]
async fn test_fresh_user_has_full_budget() {
    let fixture = fixture();
    let status = fixture
        .service
        .check_rate_limit(Uuid::new_v4(), VerificationAction::Totp)
        .await
        .unwrap();

    assert_eq!(status.action, VerificationAction::Totp);
    assert_eq!(status.remaining, 5);
    assert!(!status.limited);
    assert!(status.reset_at.is_none());
}

#[tokio::test]
async fn test_checking_does_not_consume_attempts() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();

    for _ in 0..3 {
        fixture
            .service
            .check_rate_limit(user_id, VerificationAction::Sms)
            .await
            .unwrap();
    }

    let status = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Sms)
        .await
        .unwrap();
    assert_eq!(status.remaining, 5);
}

#[tokio::test]
async fn test_increment_counts_down_the_budget() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();

    for _ in 0..2 {
        fixture
            .service
            .increment_attempts(user_id, VerificationAction::Totp)
            .await
            .unwrap();
    }

    let status = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Totp)
        .await
        .unwrap();
    assert_eq!(status.remaining, 3);
    assert!(!status.limited);
}

#[tokio::test]
async fn test_exhausted_budget_reports_reset_instant() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();

    for _ in 0..5 {
        fixture
            .service
            .increment_attempts(user_id, VerificationAction::Backup)
            .await
            .unwrap();
    }

    let status = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Backup)
        .await
        .unwrap();
    assert_eq!(status.remaining, 0);
    assert!(status.limited);
    assert!(status.reset_at.unwrap() > Utc::now());
}

#[tokio::test]
async fn test_action_families_are_independent() {
    let fixture = fixture();
    let user_id = Uuid::new_v4();

    for _ in 0..5 {
        fixture
            .service
            .increment_attempts(user_id, VerificationAction::Totp)
            .await
            .unwrap();
    }

    let totp = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Totp)
        .await
        .unwrap();
    assert!(totp.limited);

    let sms = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Sms)
        .await
        .unwrap();
    assert!(!sms.limited);
    assert_eq!(sms.remaining, 5);
}

#[tokio::test]
async fn test_budget_restores_when_window_elapses() {
    let config = TwoFactorConfig {
        action_window_ms: 50,
        ..TwoFactorConfig::default()
    };
    let fixture = fixture_with_config(config);
    let user_id = Uuid::new_v4();

    for _ in 0..5 {
        fixture
            .service
            .increment_attempts(user_id, VerificationAction::Sms)
            .await
            .unwrap();
    }
    assert!(fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Sms)
        .await
        .unwrap()
        .limited);

    tokio::time::sleep(Duration::from_millis(90)).await;

    let status = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Sms)
        .await
        .unwrap();
    assert!(!status.limited);
    assert_eq!(status.remaining, 5);

    // The next failure starts a fresh window at one
    fixture
        .service
        .increment_attempts(user_id, VerificationAction::Sms)
        .await
        .unwrap();
    let status = fixture
        .service
        .check_rate_limit(user_id, VerificationAction::Sms)
        .await
        .unwrap();
    assert_eq!(status.remaining, 4);
}
