//! MySQL repository implementations.

mod event_repository;
mod user_repository;

pub use event_repository::MySqlSecurityEventRepository;
pub use user_repository::MySqlUserSecurityRepository;
