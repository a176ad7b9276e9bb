//! Security audit service recording the platform's security trail.
//!
//! Recording is deliberately infallible: a failure to persist an event
//! is logged and swallowed so that auditing can never break a login or
//! verification flow. Queries over the trail report their errors
//! normally.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use sd_shared::AuditConfig;

use crate::domain::entities::audit::{EventContext, SecurityEvent, SecurityEventKind};
use crate::errors::DomainResult;
use crate::repositories::SecurityEventRepository;

use super::anomaly::{AnomalyDetector, IpReputation};
use super::hook::{NoopSuspicionHandler, SuspicionHandler};

/// Lookback for post-record anomaly evaluation; covers the widest
/// burst signature window.
const DETECTION_LOOKBACK_MINUTES: i64 = 60;

/// Aggregate view over a slice of the audit trail
#[derive(Debug, Clone, Serialize)]
pub struct AuditStatistics {
    /// Events in the period
    pub total_events: u64,

    /// Distinct source IP addresses seen
    pub distinct_ip_count: u64,

    /// Distinct users seen
    pub distinct_user_count: u64,

    /// Event counts keyed by canonical kind string
    pub by_kind: HashMap<String, u64>,
}

/// Exportable summary of one user's security history
#[derive(Debug, Clone, Serialize)]
pub struct UserSecurityReport {
    pub user_id: Uuid,
    pub generated_at: DateTime<Utc>,

    /// How many days of history the report covers
    pub period_days: i64,

    pub total_events: u64,
    pub failure_count: u64,

    /// Distinct source IP addresses seen in the period
    pub distinct_ip_count: u64,

    /// Event counts keyed by canonical kind string
    pub by_kind: HashMap<String, u64>,

    /// The events themselves, newest first
    pub events: Vec<SecurityEvent>,
}

/// Service owning the security audit trail
pub struct SecurityAuditService<R>
where
    R: SecurityEventRepository,
{
    repository: Arc<R>,
    detector: AnomalyDetector<R>,
    handler: Arc<dyn SuspicionHandler>,
    config: AuditConfig,
}

impl<R> SecurityAuditService<R>
where
    R: SecurityEventRepository,
{
    /// Create an audit service with no suspicious-activity follow-up
    pub fn new(repository: Arc<R>, config: AuditConfig) -> Self {
        let detector =
            AnomalyDetector::new(Arc::clone(&repository)).with_fetch_limit(config.detector_fetch_limit);
        Self {
            repository,
            detector,
            handler: Arc::new(NoopSuspicionHandler),
            config,
        }
    }

    /// Attach a handler fired on each positive detection
    pub fn with_handler(mut self, handler: Arc<dyn SuspicionHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Access the detector, e.g. for IP reputation checks
    pub fn detector(&self) -> &AnomalyDetector<R> {
        &self.detector
    }

    /// Record a security event
    ///
    /// Assigns the server-side timestamp, persists the event and then
    /// runs anomaly detection for the affected user. Never fails;
    /// persistence and detection errors are logged and swallowed.
    ///
    /// # Arguments
    /// * `user_id` - The user the event concerns, when known
    /// * `kind` - What happened
    /// * `context` - Request metadata to attach
    pub async fn record(&self, user_id: Option<Uuid>, kind: SecurityEventKind, context: EventContext) {
        if !self.config.enabled {
            return;
        }

        let mut event = SecurityEvent::new(kind).with_context(context);
        if let Some(user_id) = user_id {
            event = event.with_user(user_id);
        }

        if let Err(err) = self.repository.insert(&event).await {
            error!(kind = %event.kind, error = %err, "failed to record security event");
            return;
        }

        self.run_detection(&event).await;
    }

    /// Evaluate the burst signatures for the user behind `event`
    ///
    /// A positive verdict appends a suspicious-activity event and fires
    /// the handler. Flag events themselves are never evaluated, so one
    /// detection cannot cascade into another.
    async fn run_detection(&self, event: &SecurityEvent) {
        if !self.config.anomaly_detection_enabled {
            return;
        }
        if event.kind == SecurityEventKind::SuspiciousActivity {
            return;
        }
        let Some(user_id) = event.user_id else {
            return;
        };

        let since = Utc::now() - Duration::minutes(DETECTION_LOOKBACK_MINUTES);
        let recent = match self.repository.find_by_user_since(user_id, since).await {
            Ok(events) => events,
            Err(err) => {
                warn!(%user_id, error = %err, "anomaly detection query failed");
                return;
            }
        };
        let recent: Vec<SecurityEvent> = recent
            .into_iter()
            .take(self.config.detector_fetch_limit)
            .collect();

        let Some(verdict) = self.detector.evaluate(&recent, Utc::now()) else {
            return;
        };

        warn!(%user_id, pattern = %verdict.pattern, "suspicious activity detected");

        let mut context = EventContext::new()
            .with_reason("pattern-based detection")
            .with_details(json!({
                "pattern": verdict.pattern,
                "eventsConsidered": verdict.events_considered,
            }));
        // Carry the triggering address so reputation checks see the flag
        if let Some(ip_address) = &event.ip_address {
            context = context.with_ip(ip_address.clone());
        }

        let flag = SecurityEvent::new(SecurityEventKind::SuspiciousActivity)
            .with_user(user_id)
            .with_context(context);
        if let Err(err) = self.repository.insert(&flag).await {
            error!(%user_id, error = %err, "failed to record suspicious-activity event");
        }

        self.handler.on_suspicious_activity(user_id, &verdict).await;
    }

    /// Page through a user's events, newest first
    pub async fn events_for_user(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> DomainResult<Vec<SecurityEvent>> {
        self.repository.find_by_user(user_id, limit, offset).await
    }

    /// Recent events from one source address, newest first
    ///
    /// # Arguments
    /// * `ip_address` - The address to search for
    /// * `hours_back` - How far back to look
    /// * `limit` - Maximum number of events to return
    pub async fn events_for_ip(
        &self,
        ip_address: &str,
        hours_back: i64,
        limit: usize,
    ) -> DomainResult<Vec<SecurityEvent>> {
        let since = Utc::now() - Duration::hours(hours_back);
        self.repository.find_by_ip_since(ip_address, since, limit).await
    }

    /// Aggregate statistics over the trailing `hours_back` hours
    pub async fn statistics(&self, hours_back: i64) -> DomainResult<AuditStatistics> {
        let since = Utc::now() - Duration::hours(hours_back);
        let events = self.repository.find_since(since).await?;

        let mut by_kind: HashMap<String, u64> = HashMap::new();
        let mut ips: HashSet<&str> = HashSet::new();
        let mut users: HashSet<Uuid> = HashSet::new();
        for event in &events {
            *by_kind.entry(event.kind.as_str().to_string()).or_insert(0) += 1;
            if let Some(ip_address) = &event.ip_address {
                ips.insert(ip_address);
            }
            if let Some(user_id) = event.user_id {
                users.insert(user_id);
            }
        }

        Ok(AuditStatistics {
            total_events: events.len() as u64,
            distinct_ip_count: ips.len() as u64,
            distinct_user_count: users.len() as u64,
            by_kind,
        })
    }

    /// Compile a user's security history over the trailing `days_back` days
    pub async fn export_user_report(
        &self,
        user_id: Uuid,
        days_back: i64,
    ) -> DomainResult<UserSecurityReport> {
        let since = Utc::now() - Duration::days(days_back);
        let events = self.repository.find_by_user_since(user_id, since).await?;

        let mut by_kind: HashMap<String, u64> = HashMap::new();
        let mut failure_count = 0u64;
        for event in &events {
            *by_kind.entry(event.kind.as_str().to_string()).or_insert(0) += 1;
            if event.is_failure() {
                failure_count += 1;
            }
        }
        let distinct_ip_count = events
            .iter()
            .filter_map(|event| event.ip_address.as_deref())
            .collect::<HashSet<_>>()
            .len() as u64;

        Ok(UserSecurityReport {
            user_id,
            generated_at: Utc::now(),
            period_days: days_back,
            total_events: events.len() as u64,
            failure_count,
            distinct_ip_count,
            by_kind,
            events,
        })
    }

    /// Delete events older than `days_to_keep` days
    ///
    /// # Returns
    /// * Number of events removed
    pub async fn purge_older_than(&self, days_to_keep: i64) -> DomainResult<u64> {
        let cutoff = Utc::now() - Duration::days(days_to_keep);
        self.repository.delete_older_than(cutoff).await
    }

    /// Delete events past the configured retention period
    pub async fn purge_expired(&self) -> DomainResult<u64> {
        self.purge_older_than(self.config.retention_days as i64).await
    }

    /// Score the reputation of a source address
    pub async fn check_ip_reputation(&self, ip_address: &str) -> DomainResult<IpReputation> {
        self.detector.check_ip_reputation(ip_address).await
    }
}
