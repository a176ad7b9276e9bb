//! Unit tests for the security audit service

use std::sync::{Arc, Mutex};
use uuid::Uuid;

use sd_shared::AuditConfig;

use super::mocks::{event_minutes_ago, ip_event_ms_ago, RecordingSuspicionHandler};
use crate::domain::entities::audit::{EventContext, SecurityEventKind};
use crate::repositories::audit::MockSecurityEventRepository;
use crate::services::audit::SecurityAuditService;

fn service(
    repository: Arc<MockSecurityEventRepository>,
) -> SecurityAuditService<MockSecurityEventRepository> {
    SecurityAuditService::new(repository, AuditConfig::default())
}

#[tokio::test]
async fn test_record_appends_an_event_with_server_timestamp() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();

    let before = chrono::Utc::now();
    service
        .record(
            Some(user_id),
            SecurityEventKind::LoginSuccess,
            EventContext::new().with_request("203.0.113.7", "Mozilla/5.0"),
        )
        .await;

    let events = repository.get_all_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, SecurityEventKind::LoginSuccess);
    assert_eq!(events[0].user_id, Some(user_id));
    assert_eq!(events[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert!(events[0].created_at >= before);
    assert!(events[0].created_at <= chrono::Utc::now());
}

#[tokio::test]
async fn test_record_swallows_repository_failures() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    repository.set_should_fail(true);
    let service = service(Arc::clone(&repository));

    // Must not panic or surface the error
    service
        .record(
            Some(Uuid::new_v4()),
            SecurityEventKind::LoginFailure,
            EventContext::new(),
        )
        .await;

    repository.set_should_fail(false);
    assert!(repository.get_all_events().is_empty());
}

#[tokio::test]
async fn test_disabled_audit_drops_events() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let config = AuditConfig {
        enabled: false,
        ..AuditConfig::default()
    };
    let service = SecurityAuditService::new(Arc::clone(&repository), config);

    service
        .record(
            Some(Uuid::new_v4()),
            SecurityEventKind::LoginSuccess,
            EventContext::new(),
        )
        .await;

    assert!(repository.get_all_events().is_empty());
}

#[tokio::test]
async fn test_failure_burst_appends_one_suspicious_activity_flag() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();

    for _ in 0..5 {
        service
            .record(
                Some(user_id),
                SecurityEventKind::LoginFailure,
                EventContext::new().with_ip("203.0.113.7"),
            )
            .await;
    }

    let events = repository.get_all_events();
    let flags: Vec<_> = events
        .iter()
        .filter(|event| event.kind == SecurityEventKind::SuspiciousActivity)
        .collect();
    assert_eq!(flags.len(), 1);

    let flag = flags[0];
    assert_eq!(flag.user_id, Some(user_id));
    assert_eq!(flag.reason.as_deref(), Some("pattern-based detection"));
    // The flag inherits the triggering address
    assert_eq!(flag.ip_address.as_deref(), Some("203.0.113.7"));

    let details = flag.details.as_ref().unwrap();
    assert_eq!(details["eventsConsidered"], 5);
}

#[tokio::test]
async fn test_flag_events_do_not_cascade() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();

    // Recording flags directly must never trigger further detection
    for _ in 0..10 {
        service
            .record(
                Some(user_id),
                SecurityEventKind::SuspiciousActivity,
                EventContext::new(),
            )
            .await;
    }

    let events = repository.get_all_events();
    assert_eq!(events.len(), 10);
}

#[tokio::test]
async fn test_events_without_a_user_skip_detection() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));

    for _ in 0..5 {
        service
            .record(None, SecurityEventKind::LoginFailure, EventContext::new())
            .await;
    }

    let events = repository.get_all_events();
    assert!(events
        .iter()
        .all(|event| event.kind != SecurityEventKind::SuspiciousActivity));
}

#[tokio::test]
async fn test_detection_can_be_disabled() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let config = AuditConfig {
        anomaly_detection_enabled: false,
        ..AuditConfig::default()
    };
    let service = SecurityAuditService::new(Arc::clone(&repository), config);
    let user_id = Uuid::new_v4();

    for _ in 0..5 {
        service
            .record(Some(user_id), SecurityEventKind::LoginFailure, EventContext::new())
            .await;
    }

    let events = repository.get_all_events();
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn test_handler_fires_on_positive_detection() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let service = SecurityAuditService::new(Arc::clone(&repository), AuditConfig::default())
        .with_handler(Arc::new(RecordingSuspicionHandler::new(Arc::clone(&calls))));
    let user_id = Uuid::new_v4();

    for _ in 0..5 {
        service
            .record(Some(user_id), SecurityEventKind::LoginFailure, EventContext::new())
            .await;
    }

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, user_id);
    assert!(calls[0].1.contains("LOGIN_FAILURE"));
}

#[tokio::test]
async fn test_events_for_user_pages_newest_first() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();

    repository.seed(event_minutes_ago(SecurityEventKind::LoginSuccess, user_id, 30));
    repository.seed(event_minutes_ago(SecurityEventKind::LoginFailure, user_id, 20));
    repository.seed(event_minutes_ago(SecurityEventKind::LoginSuccess, user_id, 10));

    let first_page = service.events_for_user(user_id, 2, 0).await.unwrap();
    assert_eq!(first_page.len(), 2);
    assert!(first_page[0].created_at > first_page[1].created_at);

    let second_page = service.events_for_user(user_id, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].kind, SecurityEventKind::LoginSuccess);
}

#[tokio::test]
async fn test_events_for_ip_respects_the_window() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));

    repository.seed(ip_event_ms_ago(
        SecurityEventKind::LoginFailure,
        "203.0.113.7",
        30 * 60_000,
    ));
    repository.seed(ip_event_ms_ago(
        SecurityEventKind::LoginFailure,
        "203.0.113.7",
        5 * 3_600_000,
    ));

    let events = service.events_for_ip("203.0.113.7", 1, 50).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_statistics_aggregate_the_period() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    repository.seed(event_minutes_ago(SecurityEventKind::LoginSuccess, alice, 10));
    repository.seed(event_minutes_ago(SecurityEventKind::LoginFailure, alice, 9));
    repository.seed(event_minutes_ago(SecurityEventKind::LoginFailure, bob, 8));
    repository.seed(ip_event_ms_ago(
        SecurityEventKind::RateLimitExceeded,
        "203.0.113.7",
        60_000,
    ));
    repository.seed(ip_event_ms_ago(
        SecurityEventKind::RateLimitExceeded,
        "198.51.100.1",
        60_000,
    ));
    // Outside the one-hour window
    repository.seed(event_minutes_ago(SecurityEventKind::LoginSuccess, alice, 120));

    let stats = service.statistics(1).await.unwrap();
    assert_eq!(stats.total_events, 5);
    assert_eq!(stats.distinct_user_count, 2);
    assert_eq!(stats.distinct_ip_count, 2);
    assert_eq!(stats.by_kind["LOGIN_FAILURE"], 2);
    assert_eq!(stats.by_kind["LOGIN_SUCCESS"], 1);
    assert_eq!(stats.by_kind["RATE_LIMIT_EXCEEDED"], 2);
}

#[tokio::test]
async fn test_user_report_summarizes_history() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();

    let mut home = event_minutes_ago(SecurityEventKind::LoginSuccess, user_id, 60);
    home.ip_address = Some("203.0.113.7".to_string());
    repository.seed(home);
    let mut travel = event_minutes_ago(SecurityEventKind::LoginFailure, user_id, 50);
    travel.ip_address = Some("198.51.100.1".to_string());
    repository.seed(travel);
    repository.seed(event_minutes_ago(SecurityEventKind::TwoFactorSuccess, user_id, 40));
    // Another user's event never leaks into the report
    repository.seed(event_minutes_ago(
        SecurityEventKind::LoginFailure,
        Uuid::new_v4(),
        30,
    ));

    let report = service.export_user_report(user_id, 7).await.unwrap();
    assert_eq!(report.user_id, user_id);
    assert_eq!(report.period_days, 7);
    assert_eq!(report.total_events, 3);
    assert_eq!(report.failure_count, 1);
    assert_eq!(report.distinct_ip_count, 2);
    assert_eq!(report.by_kind["LOGIN_SUCCESS"], 1);
    assert_eq!(report.events.len(), 3);
    assert!(report.events[0].created_at > report.events[2].created_at);
}

#[tokio::test]
async fn test_purge_removes_only_old_events() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    let user_id = Uuid::new_v4();

    repository.seed(event_minutes_ago(
        SecurityEventKind::LoginSuccess,
        user_id,
        40 * 24 * 60,
    ));
    repository.seed(event_minutes_ago(SecurityEventKind::LoginSuccess, user_id, 10));

    let purged = service.purge_older_than(30).await.unwrap();
    assert_eq!(purged, 1);
    assert_eq!(repository.get_all_events().len(), 1);
}

#[tokio::test]
async fn test_query_errors_are_surfaced() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));
    repository.set_should_fail(true);

    assert!(service.events_for_user(Uuid::new_v4(), 10, 0).await.is_err());
    assert!(service.statistics(24).await.is_err());
    assert!(service.purge_older_than(30).await.is_err());
}

#[tokio::test]
async fn test_ip_reputation_through_the_service() {
    let repository = Arc::new(MockSecurityEventRepository::new());
    let service = service(Arc::clone(&repository));

    repository.seed(ip_event_ms_ago(
        SecurityEventKind::SuspiciousActivity,
        "203.0.113.7",
        60_000,
    ));

    let reputation = service.check_ip_reputation("203.0.113.7").await.unwrap();
    assert_eq!(reputation.score, 50);
    assert!(reputation.is_suspicious());
}
