pub mod audit;
pub mod user;
pub mod verification;

pub use audit::SecurityEventRepository;
pub use user::UserSecurityRepository;
pub use verification::VerificationStateRepository;

#[cfg(test)]
pub use audit::MockSecurityEventRepository;
