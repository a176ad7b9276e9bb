//! Unit tests for burst signatures and IP reputation scoring

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::mocks::{event_minutes_ago, ip_event_ms_ago};
use crate::domain::entities::audit::SecurityEventKind;
use crate::repositories::audit::MockSecurityEventRepository;
use crate::services::audit::AnomalyDetector;

fn detector() -> AnomalyDetector<MockSecurityEventRepository> {
    AnomalyDetector::new(Arc::new(MockSecurityEventRepository::new()))
}

#[test]
fn test_five_login_failures_in_five_minutes_are_flagged() {
    let user_id = Uuid::new_v4();
    let events: Vec<_> = (0..5)
        .map(|i| event_minutes_ago(SecurityEventKind::LoginFailure, user_id, i))
        .collect();

    let verdict = detector().evaluate(&events, Utc::now()).unwrap();
    assert!(verdict.pattern.contains("LOGIN_FAILURE"));
    assert_eq!(verdict.events_considered, 5);
}

#[test]
fn test_four_login_failures_are_not_flagged() {
    let user_id = Uuid::new_v4();
    let events: Vec<_> = (0..4)
        .map(|i| event_minutes_ago(SecurityEventKind::LoginFailure, user_id, i))
        .collect();

    assert!(detector().evaluate(&events, Utc::now()).is_none());
}

#[test]
fn test_failures_outside_the_window_do_not_count() {
    let user_id = Uuid::new_v4();
    // Two recent, three well past the five-minute window
    let mut events = vec![
        event_minutes_ago(SecurityEventKind::LoginFailure, user_id, 0),
        event_minutes_ago(SecurityEventKind::LoginFailure, user_id, 1),
    ];
    for minutes in [10, 20, 30] {
        events.push(event_minutes_ago(
            SecurityEventKind::LoginFailure,
            user_id,
            minutes,
        ));
    }

    assert!(detector().evaluate(&events, Utc::now()).is_none());
}

#[test]
fn test_two_factor_failures_need_ten_in_fifteen_minutes() {
    let user_id = Uuid::new_v4();
    let mut events: Vec<_> = (0..9)
        .map(|i| event_minutes_ago(SecurityEventKind::TwoFactorFailure, user_id, i))
        .collect();
    assert!(detector().evaluate(&events, Utc::now()).is_none());

    events.push(event_minutes_ago(
        SecurityEventKind::TwoFactorFailure,
        user_id,
        9,
    ));
    let verdict = detector().evaluate(&events, Utc::now()).unwrap();
    assert!(verdict.pattern.contains("TWO_FACTOR_FAILURE"));
}

#[test]
fn test_sms_issuance_burst_over_an_hour() {
    let user_id = Uuid::new_v4();
    let events: Vec<_> = (0..5)
        .map(|i| event_minutes_ago(SecurityEventKind::SmsOtpSent, user_id, i * 10))
        .collect();

    let verdict = detector().evaluate(&events, Utc::now()).unwrap();
    assert!(verdict.pattern.contains("SMS_OTP_SENT"));
}

#[test]
fn test_three_rate_limit_denials_in_fifteen_minutes() {
    let user_id = Uuid::new_v4();
    let events: Vec<_> = (0..3)
        .map(|i| event_minutes_ago(SecurityEventKind::RateLimitExceeded, user_id, i * 5))
        .collect();

    let verdict = detector().evaluate(&events, Utc::now()).unwrap();
    assert!(verdict.pattern.contains("RATE_LIMIT_EXCEEDED"));
}

#[test]
fn test_different_kinds_do_not_combine() {
    let user_id = Uuid::new_v4();
    let mut events: Vec<_> = (0..3)
        .map(|i| event_minutes_ago(SecurityEventKind::LoginFailure, user_id, i))
        .collect();
    events.push(event_minutes_ago(
        SecurityEventKind::TwoFactorFailure,
        user_id,
        0,
    ));
    events.push(event_minutes_ago(
        SecurityEventKind::SmsOtpFailure,
        user_id,
        0,
    ));

    assert!(detector().evaluate(&events, Utc::now()).is_none());
}

#[test]
fn test_evaluation_is_deterministic() {
    let user_id = Uuid::new_v4();
    let events: Vec<_> = (0..5)
        .map(|i| event_minutes_ago(SecurityEventKind::LoginFailure, user_id, i))
        .collect();
    let now = Utc::now();

    let detector = detector();
    let first = detector.evaluate(&events, now).unwrap();
    let second = detector.evaluate(&events, now).unwrap();
    assert_eq!(first.pattern, second.pattern);
    assert_eq!(first.events_considered, second.events_considered);
}

#[test]
fn test_clean_address_scores_zero() {
    let events = vec![ip_event_ms_ago(
        SecurityEventKind::LoginSuccess,
        "203.0.113.7",
        5_000,
    )];

    let reputation = detector().score_events("203.0.113.7", &events);
    assert_eq!(reputation.score, 0);
    assert!(!reputation.is_suspicious());
    assert!(!reputation.is_blocked());
    assert!(reputation.reasons.is_empty());
}

#[test]
fn test_ten_failures_score_thirty() {
    // Spaced out so the rapid-sequence rule stays quiet
    let events: Vec<_> = (0..10)
        .map(|i| {
            ip_event_ms_ago(
                SecurityEventKind::LoginFailure,
                "203.0.113.7",
                i * 60_000,
            )
        })
        .collect();

    let reputation = detector().score_events("203.0.113.7", &events);
    assert_eq!(reputation.score, 30);
    assert!(!reputation.is_suspicious());
    assert_eq!(reputation.reasons.len(), 1);
}

#[test]
fn test_prior_flag_scores_fifty() {
    let events = vec![ip_event_ms_ago(
        SecurityEventKind::SuspiciousActivity,
        "203.0.113.7",
        60_000,
    )];

    let reputation = detector().score_events("203.0.113.7", &events);
    assert_eq!(reputation.score, 50);
    assert!(reputation.is_suspicious());
    assert!(!reputation.is_blocked());
}

#[test]
fn test_rapid_sequence_scores_twenty() {
    // Five requests half a second apart
    let events: Vec<_> = (0..5)
        .map(|i| ip_event_ms_ago(SecurityEventKind::LoginSuccess, "203.0.113.7", i * 500))
        .collect();

    let reputation = detector().score_events("203.0.113.7", &events);
    assert_eq!(reputation.score, 20);
    assert!(!reputation.is_suspicious());
}

#[test]
fn test_slow_sequence_is_not_rapid() {
    let events: Vec<_> = (0..5)
        .map(|i| ip_event_ms_ago(SecurityEventKind::LoginSuccess, "203.0.113.7", i * 2_000))
        .collect();

    let reputation = detector().score_events("203.0.113.7", &events);
    assert_eq!(reputation.score, 0);
}

#[test]
fn test_combined_signals_reach_the_block_threshold() {
    let mut events: Vec<_> = (0..10)
        .map(|i| {
            ip_event_ms_ago(
                SecurityEventKind::LoginFailure,
                "203.0.113.7",
                i * 60_000,
            )
        })
        .collect();
    events.push(ip_event_ms_ago(
        SecurityEventKind::SuspiciousActivity,
        "203.0.113.7",
        30_000,
    ));

    let reputation = detector().score_events("203.0.113.7", &events);
    assert_eq!(reputation.score, 80);
    assert!(reputation.is_blocked());
    assert_eq!(reputation.reasons.len(), 2);
}

#[test]
fn test_more_evidence_never_lowers_the_score() {
    let base: Vec<_> = (0..10)
        .map(|i| {
            ip_event_ms_ago(
                SecurityEventKind::LoginFailure,
                "203.0.113.7",
                i * 60_000,
            )
        })
        .collect();
    let detector = detector();
    let base_score = detector.score_events("203.0.113.7", &base).score;

    let mut extended = base.clone();
    extended.push(ip_event_ms_ago(
        SecurityEventKind::SuspiciousActivity,
        "203.0.113.7",
        10_000,
    ));
    let extended_score = detector.score_events("203.0.113.7", &extended).score;

    assert!(extended_score >= base_score);
}

#[tokio::test]
async fn test_reputation_check_reads_the_trail() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    repository.seed(ip_event_ms_ago(
        SecurityEventKind::SuspiciousActivity,
        "203.0.113.7",
        60_000,
    ));
    let detector = AnomalyDetector::new(Arc::clone(&repository));

    let reputation = detector.check_ip_reputation("203.0.113.7").await.unwrap();
    assert_eq!(reputation.score, 50);

    // A different address sees none of those events
    let other = detector.check_ip_reputation("198.51.100.1").await.unwrap();
    assert_eq!(other.score, 0);
}
