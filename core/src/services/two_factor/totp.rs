//! TOTP secret generation, token verification and QR rendering.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use qrcode::render::svg;
use qrcode::QrCode;
use totp_rs::{Algorithm, Secret, TOTP};

use sd_shared::TwoFactorConfig;

use crate::errors::{DomainError, DomainResult};

/// Rendered QR edge length in pixels
const QR_DIMENSION: u32 = 200;

/// Freshly generated enrollment material
///
/// The secret is pending until the user proves possession by submitting
/// a first valid token; nothing is persisted at generation time.
#[derive(Debug, Clone)]
pub struct TotpSecret {
    /// Base32-encoded secret for manual entry
    pub base32: String,

    /// `otpauth://` provisioning URI for authenticator apps
    pub otpauth_uri: String,
}

/// Stateless TOTP operations parameterized by deployment config
pub struct TotpProvider {
    issuer: String,
    digits: usize,
    skew: u8,
    step_seconds: u64,
}

impl TotpProvider {
    pub fn new(config: &TwoFactorConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            digits: config.totp_digits,
            skew: config.totp_skew,
            step_seconds: config.totp_step_seconds,
        }
    }

    /// Generate a fresh random secret and its provisioning URI
    ///
    /// # Arguments
    /// * `account_label` - Account name shown in the authenticator app
    pub fn generate_secret(&self, account_label: &str) -> DomainResult<TotpSecret> {
        let totp = self.build(Secret::generate_secret(), account_label)?;
        Ok(TotpSecret {
            base32: totp.get_secret_base32(),
            otpauth_uri: totp.get_url(),
        })
    }

    /// Check a submitted token against a stored base32 secret
    ///
    /// Accepts the configured clock drift on either side of now.
    pub fn verify(&self, base32_secret: &str, token: &str) -> DomainResult<bool> {
        let totp = self.build(Secret::Encoded(base32_secret.to_string()), "verification")?;
        Ok(totp.check_current(token).unwrap_or(false))
    }

    fn build(&self, secret: Secret, account_label: &str) -> DomainResult<TOTP> {
        let secret_bytes = secret.to_bytes().map_err(|e| DomainError::Internal {
            message: format!("Invalid TOTP secret: {}", e),
        })?;
        TOTP::new(
            Algorithm::SHA1,
            self.digits,
            self.skew,
            self.step_seconds,
            secret_bytes,
            Some(self.issuer.clone()),
            account_label.to_string(),
        )
        .map_err(|e| DomainError::Internal {
            message: format!("Failed to initialize TOTP: {}", e),
        })
    }
}

/// Render a provisioning URI as an SVG QR code packed in a data URI
///
/// The returned string drops straight into an `<img src="...">`.
pub fn qr_code_data_uri(otpauth_uri: &str) -> DomainResult<String> {
    let code = QrCode::new(otpauth_uri.as_bytes()).map_err(|e| DomainError::Internal {
        message: format!("Failed to build QR code: {}", e),
    })?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(QR_DIMENSION, QR_DIMENSION)
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        BASE64.encode(image.as_bytes())
    ))
}
