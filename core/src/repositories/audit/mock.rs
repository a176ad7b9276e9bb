//! Mock implementation of SecurityEventRepository for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::audit::SecurityEvent;
use crate::errors::DomainError;

use super::SecurityEventRepository;

/// Mock implementation of SecurityEventRepository for testing
pub struct MockSecurityEventRepository {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockSecurityEventRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Get all stored events for testing
    pub fn get_all_events(&self) -> Vec<SecurityEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Push an event directly, bypassing the trait
    pub fn seed(&self, event: SecurityEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// Clear all events
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Default for MockSecurityEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecurityEventRepository for MockSecurityEventRepository {
    async fn insert(&self, event: &SecurityEvent) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let mut events = self.events.lock().unwrap();
        events.push(event.clone());
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SecurityEvent>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let events = self.events.lock().unwrap();
        let mut result: Vec<SecurityEvent> = events
            .iter()
            .filter(|event| event.user_id == Some(user_id))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let result = result.into_iter().skip(offset).take(limit).collect();
        Ok(result)
    }

    async fn find_by_user_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<SecurityEvent>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let events = self.events.lock().unwrap();
        let mut result: Vec<SecurityEvent> = events
            .iter()
            .filter(|event| event.user_id == Some(user_id) && event.created_at >= since)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_by_ip_since(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<SecurityEvent>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let events = self.events.lock().unwrap();
        let mut result: Vec<SecurityEvent> = events
            .iter()
            .filter(|event| {
                event.ip_address.as_deref() == Some(ip_address) && event.created_at >= since
            })
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result.truncate(limit);
        Ok(result)
    }

    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<SecurityEvent>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let events = self.events.lock().unwrap();
        let mut result: Vec<SecurityEvent> = events
            .iter()
            .filter(|event| event.created_at >= since)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let mut events = self.events.lock().unwrap();
        let initial_count = events.len();
        events.retain(|event| event.created_at >= cutoff);
        Ok((initial_count - events.len()) as u64)
    }
}
