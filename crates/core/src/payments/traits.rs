//! Persistence and provider seams for payment processing.
//!
//! Repositories are implemented by the db crate; providers by the api crate.

use std::future::Future;

use ona_shared::OutgoingEmail;
use uuid::Uuid;

use super::error::PaymentError;
use super::types::{CreateLicenseInput, CreateUserInput, License, PaymentStatus, User};

/// Repository trait for user persistence.
pub trait UserRepository: Send + Sync {
    /// Find a user by email, case-insensitively.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, PaymentError>> + Send;

    /// Create a user.
    fn create(&self, input: CreateUserInput)
    -> impl Future<Output = Result<User, PaymentError>> + Send;
}

/// Repository trait for license persistence.
pub trait LicenseRepository: Send + Sync {
    /// Find the license paid with a payment intent.
    fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> impl Future<Output = Result<Option<License>, PaymentError>> + Send;

    /// Find the license created from a checkout session.
    fn find_by_checkout_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Option<License>, PaymentError>> + Send;

    /// Create a license.
    fn create(
        &self,
        input: CreateLicenseInput,
    ) -> impl Future<Output = Result<License, PaymentError>> + Send;

    /// Set payment status and active flag.
    fn update_payment_status(
        &self,
        license_id: Uuid,
        status: PaymentStatus,
        is_active: bool,
    ) -> impl Future<Output = Result<License, PaymentError>> + Send;

    /// Whether the user holds at least one active license.
    fn has_active_license(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<bool, PaymentError>> + Send;
}

/// Identity provider that mints sign-in links.
pub trait MagicLinkProvider: Send + Sync {
    /// Return a one-time sign-in URL for `email`.
    fn create_magic_link(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<String, PaymentError>> + Send;
}

/// Transactional email delivery.
pub trait EmailSender: Send + Sync {
    /// Send a rendered email.
    fn send_email(
        &self,
        email: OutgoingEmail,
    ) -> impl Future<Output = Result<(), PaymentError>> + Send;
}
