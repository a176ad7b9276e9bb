//! Pattern-based anomaly detection over the security audit trail.
//!
//! Detection is split into a pure evaluation over an event list and the
//! repository plumbing around it, so the burst signatures can be tested
//! without storage.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::domain::entities::audit::{SecurityEvent, SecurityEventKind};
use crate::errors::DomainResult;
use crate::repositories::SecurityEventRepository;

/// Score added when an address produced a burst of failure events
const FAILURE_BURST_THRESHOLD: usize = 10;
const FAILURE_BURST_SCORE: u32 = 30;

/// Score added when an address was already flagged as suspicious
const PRIOR_FLAG_SCORE: u32 = 50;

/// Score added for machine-speed request sequences
const RAPID_SEQUENCE_RUN: usize = 5;
const RAPID_SEQUENCE_GAP_MS: i64 = 1_000;
const RAPID_SEQUENCE_SCORE: u32 = 20;

/// Reputation score at which an address is considered suspicious
pub const SUSPICIOUS_SCORE: u32 = 40;

/// Reputation score at which an address should be blocked
pub const BLOCKED_SCORE: u32 = 80;

/// How far back reputation checks look
const REPUTATION_WINDOW_HOURS: i64 = 24;

/// A burst pattern: at least `threshold` events of `kind` within `window`
#[derive(Debug, Clone)]
pub struct AnomalySignature {
    pub kind: SecurityEventKind,
    pub threshold: usize,
    pub window: Duration,
}

impl AnomalySignature {
    pub fn new(kind: SecurityEventKind, threshold: usize, window: Duration) -> Self {
        Self {
            kind,
            threshold,
            window,
        }
    }

    /// Human-readable form used in logs and flag events
    pub fn describe(&self) -> String {
        format!(
            "{} x{} within {}m",
            self.kind,
            self.threshold,
            self.window.num_minutes()
        )
    }

    fn matches(&self, events: &[SecurityEvent], now: DateTime<Utc>) -> bool {
        let since = now - self.window;
        let hits = events
            .iter()
            .filter(|event| event.kind == self.kind && event.created_at >= since)
            .count();
        hits >= self.threshold
    }
}

/// The built-in burst signatures
pub fn default_signatures() -> Vec<AnomalySignature> {
    vec![
        AnomalySignature::new(SecurityEventKind::LoginFailure, 5, Duration::minutes(5)),
        AnomalySignature::new(SecurityEventKind::TwoFactorFailure, 10, Duration::minutes(15)),
        AnomalySignature::new(SecurityEventKind::SmsOtpSent, 5, Duration::minutes(60)),
        AnomalySignature::new(SecurityEventKind::RateLimitExceeded, 3, Duration::minutes(15)),
    ]
}

/// A positive detection over a user's recent events
#[derive(Debug, Clone)]
pub struct AnomalyVerdict {
    /// Which signature fired, in [`AnomalySignature::describe`] form
    pub pattern: String,

    /// Size of the event list the evaluation ran over
    pub events_considered: usize,
}

/// Reputation assessment of a source IP address
#[derive(Debug, Clone)]
pub struct IpReputation {
    pub ip_address: String,

    /// Accumulated score; higher is worse
    pub score: u32,

    /// One entry per scoring rule that applied
    pub reasons: Vec<String>,
}

impl IpReputation {
    pub fn is_suspicious(&self) -> bool {
        self.score >= SUSPICIOUS_SCORE
    }

    pub fn is_blocked(&self) -> bool {
        self.score >= BLOCKED_SCORE
    }
}

/// Detector running burst signatures and IP reputation scoring
pub struct AnomalyDetector<R>
where
    R: SecurityEventRepository,
{
    repository: Arc<R>,
    signatures: Vec<AnomalySignature>,
    fetch_limit: usize,
}

impl<R> AnomalyDetector<R>
where
    R: SecurityEventRepository,
{
    /// Create a detector with the built-in signatures
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            signatures: default_signatures(),
            fetch_limit: 200,
        }
    }

    /// Replace the signature set
    pub fn with_signatures(mut self, signatures: Vec<AnomalySignature>) -> Self {
        self.signatures = signatures;
        self
    }

    /// Cap the number of events fetched per reputation check
    pub fn with_fetch_limit(mut self, fetch_limit: usize) -> Self {
        self.fetch_limit = fetch_limit;
        self
    }

    /// Evaluate the burst signatures over a pre-fetched event list
    ///
    /// Pure function of its inputs: the same events and clock always
    /// produce the same verdict. Signatures are checked in order and the
    /// first match wins.
    pub fn evaluate(
        &self,
        events: &[SecurityEvent],
        now: DateTime<Utc>,
    ) -> Option<AnomalyVerdict> {
        for signature in &self.signatures {
            if signature.matches(events, now) {
                return Some(AnomalyVerdict {
                    pattern: signature.describe(),
                    events_considered: events.len(),
                });
            }
        }
        None
    }

    /// Score the reputation of a source address over the last 24 hours
    pub async fn check_ip_reputation(&self, ip_address: &str) -> DomainResult<IpReputation> {
        let since = Utc::now() - Duration::hours(REPUTATION_WINDOW_HOURS);
        let events = self
            .repository
            .find_by_ip_since(ip_address, since, self.fetch_limit)
            .await?;
        Ok(self.score_events(ip_address, &events))
    }

    /// Apply the reputation scoring rules to a pre-fetched event list
    ///
    /// Each rule only ever adds to the score, so more evidence never
    /// lowers an assessment.
    pub fn score_events(&self, ip_address: &str, events: &[SecurityEvent]) -> IpReputation {
        let mut score = 0u32;
        let mut reasons = Vec::new();

        let failure_count = events.iter().filter(|event| event.is_failure()).count();
        if failure_count >= FAILURE_BURST_THRESHOLD {
            score += FAILURE_BURST_SCORE;
            reasons.push(format!("{} failure events in 24h", failure_count));
        }

        let prior_flags = events
            .iter()
            .filter(|event| event.kind == SecurityEventKind::SuspiciousActivity)
            .count();
        if prior_flags > 0 {
            score += PRIOR_FLAG_SCORE;
            reasons.push(format!("{} prior suspicious-activity flags", prior_flags));
        }

        if let Some(run) = longest_rapid_run(events) {
            score += RAPID_SEQUENCE_SCORE;
            reasons.push(format!("{} requests in under a second each", run));
        }

        IpReputation {
            ip_address: ip_address.to_string(),
            score,
            reasons,
        }
    }
}

/// Longest run of consecutive events spaced under a second apart
///
/// Returns the run length only when it reaches the scoring threshold.
fn longest_rapid_run(events: &[SecurityEvent]) -> Option<usize> {
    if events.len() < RAPID_SEQUENCE_RUN {
        return None;
    }

    let mut timestamps: Vec<DateTime<Utc>> = events.iter().map(|event| event.created_at).collect();
    timestamps.sort();

    let mut longest = 1usize;
    let mut current = 1usize;
    for pair in timestamps.windows(2) {
        let gap = pair[1] - pair[0];
        if gap < Duration::milliseconds(RAPID_SEQUENCE_GAP_MS) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }

    (longest >= RAPID_SEQUENCE_RUN).then_some(longest)
}
