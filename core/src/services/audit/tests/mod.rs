//! Tests for the security audit module

#[cfg(test)]
mod anomaly_tests;
#[cfg(test)]
mod service_tests;
