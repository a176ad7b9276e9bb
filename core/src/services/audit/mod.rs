//! Security audit module
//!
//! This module owns the platform's security trail:
//! - Best-effort event recording with server-side timestamps
//! - Synchronous anomaly detection after every recorded event
//! - IP reputation scoring over the trailing day
//! - Statistics, per-user reports and retention purges

mod anomaly;
mod hook;
mod service;

#[cfg(test)]
mod tests;

pub use anomaly::{
    default_signatures, AnomalyDetector, AnomalySignature, AnomalyVerdict, IpReputation,
    BLOCKED_SCORE, SUSPICIOUS_SCORE,
};
pub use hook::{NoopSuspicionHandler, SuspicionHandler};
pub use service::{AuditStatistics, SecurityAuditService, UserSecurityReport};
