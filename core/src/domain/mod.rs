//! Domain layer containing entities and value objects

pub mod entities;

// Re-export commonly used types
pub use entities::{
    EventContext, SecurityEvent, SecurityEventKind, UserSecurityProfile, VerificationAction,
    VerificationState,
};
