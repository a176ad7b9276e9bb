//! Authentication primitives
//!
//! Password hashing and verification behind the core
//! [`PasswordVerifier`](sd_core::services::two_factor::PasswordVerifier)
//! seam.

pub mod password;

pub use password::BcryptPasswordVerifier;
