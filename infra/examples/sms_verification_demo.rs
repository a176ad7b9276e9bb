//! Example walking the SMS one-time-password loop end to end
//!
//! Wires the two-factor service against the in-memory repositories, the
//! bcrypt verifier and the mock SMS sender, so it runs without any
//! external services.
//!
//! Run with: cargo run --example sms_verification_demo

use std::sync::Arc;

use uuid::Uuid;

use sd_core::domain::entities::audit::EventContext;
use sd_core::domain::entities::security_profile::UserSecurityProfile;
use sd_core::domain::entities::verification_state::VerificationAction;
use sd_core::repositories::audit::MockSecurityEventRepository;
use sd_core::repositories::user::MockUserSecurityRepository;
use sd_core::repositories::verification::MockVerificationStateRepository;
use sd_core::services::audit::SecurityAuditService;
use sd_core::services::two_factor::TwoFactorService;
use sd_infra::auth::BcryptPasswordVerifier;
use sd_infra::sms::MockSmsSender;
use sd_shared::{AuditConfig, TwoFactorConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let users = Arc::new(MockUserSecurityRepository::new());
    let states = Arc::new(MockVerificationStateRepository::new());
    let events = Arc::new(MockSecurityEventRepository::new());
    let audit = Arc::new(SecurityAuditService::new(events.clone(), AuditConfig::default()));
    let passwords = Arc::new(BcryptPasswordVerifier::new());
    let sms = Arc::new(MockSmsSender::new());

    let service = TwoFactorService::new(
        users.clone(),
        states,
        audit,
        sms.clone(),
        passwords.clone(),
        TwoFactorConfig::default(),
    );

    // Seed an account
    let user_id = Uuid::new_v4();
    let phone = "+14155552671";
    let password_hash = passwords.hash_password("hunter2hunter2")?;
    users.seed(UserSecurityProfile::new(user_id, password_hash).with_phone(phone));

    println!("\n=== Issuing an SMS one-time password ===");
    let context = EventContext::new().with_request("203.0.113.9", "demo-client/1.0");
    service.send_sms_otp(user_id, phone, context.clone()).await?;

    // The mock sender captured the message; pull the code back out the
    // way a user would read it off their phone
    let (_, message) = sms.last_message().ok_or("no message captured")?;
    let code = message
        .split(|c: char| !c.is_ascii_digit())
        .find(|chunk| chunk.len() == 6)
        .ok_or("no code in message")?
        .to_string();

    println!("\n=== Verifying a wrong code first ===");
    let wrong = if code == "000000" { "111111" } else { "000000" };
    match service.verify_sms_otp(user_id, wrong, context.clone()).await {
        Err(err) => println!("Rejected as expected: {}", err),
        Ok(()) => println!("Unexpected: wrong code accepted"),
    }

    let budget = service.check_rate_limit(user_id, VerificationAction::Sms).await?;
    println!(
        "Attempt budget after the miss: remaining = {}, limited = {}",
        budget.remaining, budget.limited
    );

    println!("\n=== Verifying the real code ===");
    service.verify_sms_otp(user_id, &code, context).await?;
    println!("Code accepted.");

    println!("\n=== Audit trail ===");
    for event in events.get_all_events() {
        println!("  {} user={:?}", event.kind.as_str(), event.user_id);
    }

    Ok(())
}
