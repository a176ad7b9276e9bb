//! User security profile repository module.

mod r#trait;
pub use r#trait::UserSecurityRepository;

mod mock;
pub use mock::MockUserSecurityRepository;
