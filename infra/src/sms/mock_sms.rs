//! Mock SMS Sender Implementation
//!
//! A mock implementation of the SMS sender for development and testing.
//! This implementation logs SMS messages to the console instead of
//! sending them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use sd_core::errors::DomainResult;
use sd_core::services::two_factor::SmsSender;
use sd_shared::phone::{is_valid_phone, mask_phone_number};

use crate::InfrastructureError;

/// Mock SMS sender for development and testing
///
/// This implementation:
/// - Logs SMS messages to console
/// - Validates phone numbers
/// - Generates mock message IDs
/// - Tracks message count and captures the last message for testing
#[derive(Clone)]
pub struct MockSmsSender {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Last accepted (phone, message) pair
    last_message: Arc<Mutex<Option<(String, String)>>>,
    /// Whether to simulate failures (for testing)
    simulate_failure: bool,
    /// Whether to print messages to console
    console_output: bool,
}

impl MockSmsSender {
    /// Create a new mock SMS sender
    pub fn new() -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            last_message: Arc::new(Mutex::new(None)),
            simulate_failure: false,
            console_output: true,
        }
    }

    /// Create a mock sender with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            last_message: Arc::new(Mutex::new(None)),
            simulate_failure,
            console_output,
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Reset the message counter
    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
    }

    /// Get the last accepted (phone, message) pair
    pub fn last_message(&self) -> Option<(String, String)> {
        self.last_message.lock().ok().and_then(|guard| guard.clone())
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&mut self, simulate: bool) {
        self.simulate_failure = simulate;
    }

    /// Provider label used in logs
    pub fn provider_name(&self) -> &str {
        "Mock"
    }
}

impl Default for MockSmsSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, phone_number: &str, message: &str) -> DomainResult<()> {
        // Validate phone number format
        if !is_valid_phone(phone_number) {
            return Err(InfrastructureError::Sms(format!(
                "Invalid phone number format: {}",
                mask_phone_number(phone_number)
            ))
            .into());
        }

        // Simulate failure if configured
        if self.simulate_failure {
            warn!(
                "Mock SMS sender simulating failure for phone: {}",
                mask_phone_number(phone_number)
            );
            return Err(InfrastructureError::Sms(
                "Simulated SMS sending failure".to_string(),
            )
            .into());
        }

        // Generate mock message ID
        let message_id = format!("mock_{}", Uuid::new_v4());

        // Increment message counter
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Ok(mut guard) = self.last_message.lock() {
            *guard = Some((phone_number.to_string(), message.to_string()));
        }

        // Log the SMS details
        let masked_phone = mask_phone_number(phone_number);

        if self.console_output {
            // Console output for development - show full message
            println!("\n{}", "=".repeat(60));
            println!("MOCK SMS SENDER - MESSAGE #{}", count);
            println!("{}", "=".repeat(60));
            println!("To: {}", masked_phone);
            println!("Message ID: {}", message_id);
            println!("Content: {}", message);
            println!("{}\n", "=".repeat(60));
        }

        // Structured logging for production
        info!(
            target: "sms_sender",
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            message_length = message.len(),
            "SMS sent successfully (mock)"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_sms_send_success() {
        let sender = MockSmsSender::with_options(false, false);
        let result = sender.send("+14155552671", "Test message").await;

        assert!(result.is_ok());
        assert_eq!(sender.get_message_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_sms_invalid_phone() {
        let sender = MockSmsSender::with_options(false, false);
        let result = sender.send("12345", "Test message").await;

        assert!(result.is_err());
        assert_eq!(sender.get_message_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_sms_simulate_failure() {
        let mut sender = MockSmsSender::with_options(false, false);
        sender.set_simulate_failure(true);

        let result = sender.send("+14155552671", "Test message").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_sms_captures_last_message() {
        let sender = MockSmsSender::with_options(false, false);
        sender.send("+14155552671", "Your code is 123456").await.unwrap();

        let (phone, message) = sender.last_message().unwrap();
        assert_eq!(phone, "+14155552671");
        assert!(message.contains("123456"));
    }

    #[tokio::test]
    async fn test_mock_sms_counter() {
        let sender = MockSmsSender::with_options(false, false);

        for i in 1..=3 {
            let _ = sender.send("+14155552671", &format!("Message {}", i)).await;
            assert_eq!(sender.get_message_count(), i);
        }

        sender.reset_counter();
        assert_eq!(sender.get_message_count(), 0);
    }

    #[test]
    fn test_provider_name() {
        let sender = MockSmsSender::new();
        assert_eq!(sender.provider_name(), "Mock");
    }
}
