//! Mock implementation of VerificationStateRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::verification_state::VerificationState;
use crate::errors::DomainError;

use super::VerificationStateRepository;

/// Mock implementation of VerificationStateRepository for testing
pub struct MockVerificationStateRepository {
    states: Arc<Mutex<HashMap<Uuid, VerificationState>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockVerificationStateRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Insert a state directly, bypassing the trait
    pub fn seed(&self, state: VerificationState) {
        self.states.lock().unwrap().insert(state.user_id, state);
    }

    /// Fetch a stored state for assertions
    pub fn get(&self, user_id: Uuid) -> Option<VerificationState> {
        self.states.lock().unwrap().get(&user_id).cloned()
    }
}

impl Default for MockVerificationStateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerificationStateRepository for MockVerificationStateRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<VerificationState>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let states = self.states.lock().unwrap();
        Ok(states.get(&user_id).cloned())
    }

    async fn save(&self, state: &VerificationState) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let mut states = self.states.lock().unwrap();
        states.insert(state.user_id, state.clone());
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let mut states = self.states.lock().unwrap();
        states.remove(&user_id);
        Ok(())
    }
}
