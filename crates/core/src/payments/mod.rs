//! Payment-provider driven license provisioning.
//!
//! A `checkout.session.completed` webhook runs a fixed sequence:
//! idempotency check, user upsert, tier selection, license creation, then a
//! best-effort welcome email carrying a magic sign-in link.

mod error;
mod service;
mod templates;
pub mod tier;
mod traits;
mod types;
pub mod webhook;


pub use error::PaymentError;
pub use service::PaymentService;
pub use templates::{purchase_confirmation_email, welcome_email};
pub use tier::{determine_license_tier, extract_name_from_email, generate_license_key};
pub use traits::{EmailSender, LicenseRepository, MagicLinkProvider, UserRepository};
pub use types::{
    CheckoutSession, CreateLicenseInput, CreateUserInput, FailedPayment, License, LicenseTier,
    PaymentProcessingResult, PaymentStatus, User, WebhookOutcome,
};
pub use webhook::{WebhookEnvelope, WebhookEvent, parse_event, verify_signature};
