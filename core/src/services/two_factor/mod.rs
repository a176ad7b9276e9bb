//! Two-factor authentication: TOTP enrollment, backup codes and SMS
//! one-time passwords.

mod codes;
mod service;
mod totp;
mod traits;

#[cfg(test)]
mod tests;

pub use codes::{generate_backup_codes, generate_numeric_code, hash_code};
pub use service::{ActionRateLimit, TwoFactorService};
pub use totp::{qr_code_data_uri, TotpProvider, TotpSecret};
pub use traits::{PasswordVerifier, SmsSender};
