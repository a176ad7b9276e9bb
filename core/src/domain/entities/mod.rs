//! Domain entities for account security

pub mod audit;
pub mod security_profile;
pub mod verification_state;

// Re-export commonly used entities
pub use audit::{EventContext, SecurityEvent, SecurityEventKind};
pub use security_profile::UserSecurityProfile;
pub use verification_state::{VerificationAction, VerificationState};
