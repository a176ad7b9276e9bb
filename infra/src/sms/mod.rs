//! SMS delivery module
//!
//! Implementations of the core [`SmsSender`] seam. The mock sender is
//! the only built-in provider: it logs messages instead of dispatching
//! them, which is what development and test environments want. Real
//! gateway integrations plug in through the same trait.
//!
//! ## Features
//!
//! - **Mock Implementation**: Console output for development
//! - **Phone Number Validation**: E.164 format validation
//! - **Security**: Phone number masking in logs

use std::sync::Arc;

use sd_core::services::two_factor::SmsSender;

pub mod mock_sms;

pub use mock_sms::MockSmsSender;

/// Create an SMS sender based on configuration
///
/// Returns the implementation named by `config.provider`. Unknown
/// providers fall back to the mock sender with a warning so a
/// misconfigured deployment still boots.
pub fn create_sms_sender(config: &crate::config::SmsConfig) -> Arc<dyn SmsSender> {
    match config.provider.as_str() {
        "mock" => Arc::new(MockSmsSender::new()),
        _ => {
            tracing::warn!(
                "Unknown SMS provider '{}', using mock implementation",
                config.provider
            );
            Arc::new(MockSmsSender::new())
        }
    }
}
