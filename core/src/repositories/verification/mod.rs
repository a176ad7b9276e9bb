//! Verification state repository module.

mod r#trait;
pub use r#trait::VerificationStateRepository;

mod mock;
pub use mock::MockVerificationStateRepository;
