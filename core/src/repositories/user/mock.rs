//! Mock implementation of UserSecurityRepository for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::entities::security_profile::UserSecurityProfile;
use crate::errors::DomainError;

use super::UserSecurityRepository;

/// Mock implementation of UserSecurityRepository for testing
pub struct MockUserSecurityRepository {
    profiles: Arc<Mutex<HashMap<Uuid, UserSecurityProfile>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockUserSecurityRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(HashMap::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Set whether operations should fail
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    /// Insert a profile directly, bypassing the trait
    pub fn seed(&self, profile: UserSecurityProfile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile);
    }

    /// Fetch a stored profile for assertions
    pub fn get(&self, user_id: Uuid) -> Option<UserSecurityProfile> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }
}

impl Default for MockUserSecurityRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserSecurityRepository for MockUserSecurityRepository {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserSecurityProfile>, DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.get(&user_id).cloned())
    }

    async fn save(&self, profile: &UserSecurityProfile) -> Result<(), DomainError> {
        if *self.should_fail.lock().unwrap() {
            return Err(DomainError::Internal {
                message: "Mock repository error".to_string(),
            });
        }

        let mut profiles = self.profiles.lock().unwrap();
        profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }
}
