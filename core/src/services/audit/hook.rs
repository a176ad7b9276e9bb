//! Extension point invoked when suspicious activity is flagged.

use async_trait::async_trait;
use uuid::Uuid;

use super::anomaly::AnomalyVerdict;

/// Callback fired after a suspicious-activity event has been appended
///
/// Implementations might notify an administrator or revoke the user's
/// sessions. The audit flow does not depend on the outcome, so
/// implementations handle their own failures.
#[async_trait]
pub trait SuspicionHandler: Send + Sync {
    async fn on_suspicious_activity(&self, user_id: Uuid, verdict: &AnomalyVerdict);
}

/// Handler that does nothing, used when no follow-up action is wired
pub struct NoopSuspicionHandler;

#[async_trait]
impl SuspicionHandler for NoopSuspicionHandler {
    async fn on_suspicious_activity(&self, _user_id: Uuid, _verdict: &AnomalyVerdict) {}
}
