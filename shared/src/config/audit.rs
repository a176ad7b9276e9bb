//! Security audit configuration module

use serde::{Deserialize, Serialize};

/// Security audit log settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Master switch; when disabled events are dropped without storage
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Days of history kept by scheduled purge runs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Anomaly detection after each recorded event
    #[serde(default = "default_enabled")]
    pub anomaly_detection_enabled: bool,

    /// Upper bound on events fetched per anomaly evaluation
    #[serde(default = "default_detector_fetch_limit")]
    pub detector_fetch_limit: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_retention_days() -> u32 {
    90
}

fn default_detector_fetch_limit() -> usize {
    200
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            retention_days: default_retention_days(),
            anomaly_detection_enabled: default_enabled(),
            detector_fetch_limit: default_detector_fetch_limit(),
        }
    }
}
