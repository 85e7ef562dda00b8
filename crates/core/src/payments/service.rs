//! Checkout provisioning: the webhook-driven purchase flow.

use std::sync::Arc;

use ona_shared::Role;
use tracing::{error, info, warn};

use super::error::PaymentError;
use super::templates::{purchase_confirmation_email, welcome_email};
use super::tier::{determine_license_tier, extract_name_from_email, generate_license_key, major_units};
use super::traits::{EmailSender, LicenseRepository, MagicLinkProvider, UserRepository};
use super::types::{
    CheckoutSession, CreateLicenseInput, CreateUserInput, FailedPayment, License,
    PaymentProcessingResult, PaymentStatus, User, WebhookOutcome,
};
use super::webhook::WebhookEvent;

const DEFAULT_CURRENCY: &str = "usd";

/// Provisions users and licenses from payment-provider events.
pub struct PaymentService<U, L, M, E>
where
    U: UserRepository,
    L: LicenseRepository,
    M: MagicLinkProvider,
    E: EmailSender,
{
    users: Arc<U>,
    licenses: Arc<L>,
    magic_links: Arc<M>,
    mailer: Arc<E>,
}

struct Provisioned {
    user: User,
    license: License,
    is_new_user: bool,
}

impl<U, L, M, E> PaymentService<U, L, M, E>
where
    U: UserRepository,
    L: LicenseRepository,
    M: MagicLinkProvider,
    E: EmailSender,
{
    /// Create a new payment service.
    #[must_use]
    pub fn new(users: Arc<U>, licenses: Arc<L>, magic_links: Arc<M>, mailer: Arc<E>) -> Self {
        Self {
            users,
            licenses,
            magic_links,
            mailer,
        }
    }

    /// Dispatch a parsed webhook event.
    pub async fn handle_event(&self, event: WebhookEvent) -> Result<WebhookOutcome, PaymentError> {
        match event {
            WebhookEvent::CheckoutSessionCompleted(session) => Ok(WebhookOutcome::Checkout(
                self.process_checkout_session_completed(&session).await,
            )),
            WebhookEvent::CheckoutSessionExpired(session) => {
                self.handle_checkout_session_expired(&session);
                Ok(WebhookOutcome::CheckoutExpired)
            }
            WebhookEvent::PaymentIntentFailed(failed) => {
                let license = self.handle_payment_failed(&failed).await?;
                Ok(WebhookOutcome::PaymentFailed {
                    license_id: license.map(|l| l.id),
                })
            }
            WebhookEvent::Unhandled(event_type) => {
                info!(event_type = %event_type, "ignoring unhandled webhook event");
                Ok(WebhookOutcome::Ignored(event_type))
            }
        }
    }

    /// Provision a user and lifetime license for a completed checkout.
    ///
    /// Runs idempotency check, user upsert, tier selection, license creation
    /// and the welcome email in that order. Never fails: any error in the
    /// first four steps is reported in the result, and an email failure only
    /// clears `magic_link_sent`.
    pub async fn process_checkout_session_completed(
        &self,
        session: &CheckoutSession,
    ) -> PaymentProcessingResult {
        let provisioned = match self.provision(session).await {
            Ok(provisioned) => provisioned,
            Err(e) => {
                if matches!(e, PaymentError::Duplicate { .. }) {
                    warn!(session_id = %session.id, error = %e, "duplicate checkout ignored");
                } else {
                    error!(session_id = %session.id, error = %e, "checkout provisioning failed");
                }
                return PaymentProcessingResult::failure(&e);
            }
        };

        let magic_link_sent = match self
            .send_welcome(&provisioned.user, &provisioned.license, provisioned.is_new_user)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(
                    user_id = %provisioned.user.id,
                    license_id = %provisioned.license.id,
                    error = %e,
                    "welcome email failed"
                );
                false
            }
        };

        info!(
            user_id = %provisioned.user.id,
            license_id = %provisioned.license.id,
            tier = provisioned.license.tier.as_str(),
            is_new_user = provisioned.is_new_user,
            magic_link_sent,
            "checkout provisioned"
        );

        PaymentProcessingResult::success(
            &provisioned.user,
            &provisioned.license,
            provisioned.is_new_user,
            magic_link_sent,
        )
    }

    async fn provision(&self, session: &CheckoutSession) -> Result<Provisioned, PaymentError> {
        // 1. Idempotency: read-then-act, a concurrent replay can slip through.
        if let Some(payment_intent) = &session.payment_intent
            && self
                .licenses
                .find_by_payment_intent(payment_intent)
                .await?
                .is_some()
        {
            return Err(PaymentError::duplicate(payment_intent.as_str()));
        }
        if self
            .licenses
            .find_by_checkout_session(&session.id)
            .await?
            .is_some()
        {
            return Err(PaymentError::duplicate(session.id.as_str()));
        }

        // 2. User.
        let email = session
            .customer_email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| PaymentError::MissingCustomerEmail {
                session_id: session.id.clone(),
            })?;

        let (user, is_new_user) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let user = self
                    .users
                    .create(CreateUserInput {
                        name: extract_name_from_email(&email),
                        email,
                        role: Role::User,
                        email_verified: false,
                    })
                    .await?;
                info!(user_id = %user.id, "created user from checkout");
                (user, true)
            }
        };

        // 3. Tier.
        let amount_cents = session.amount_total.unwrap_or(0);
        let tier = determine_license_tier(
            major_units(amount_cents),
            session.metadata.get("tier").map(String::as_str),
        );

        // 4. License.
        let license = self
            .licenses
            .create(CreateLicenseInput {
                user_id: user.id,
                license_key: generate_license_key(),
                tier,
                payment_status: PaymentStatus::Paid,
                stripe_payment_intent_id: session.payment_intent.clone(),
                stripe_checkout_session_id: Some(session.id.clone()),
                amount_cents,
                currency: session
                    .currency
                    .as_deref()
                    .map_or_else(|| DEFAULT_CURRENCY.to_string(), str::to_lowercase),
                is_lifetime: true,
                is_active: true,
                notes: Some(format!("Purchased via Stripe checkout session {}", session.id)),
            })
            .await?;

        Ok(Provisioned {
            user,
            license,
            is_new_user,
        })
    }

    async fn send_welcome(
        &self,
        user: &User,
        license: &License,
        is_new_user: bool,
    ) -> Result<(), PaymentError> {
        let magic_link = self.magic_links.create_magic_link(&user.email).await?;

        let email = if is_new_user {
            welcome_email(user, license, &magic_link)
        } else {
            purchase_confirmation_email(user, license, &magic_link)
        };

        self.mailer.send_email(email).await
    }

    /// Log an abandoned checkout. Nothing is persisted.
    pub fn handle_checkout_session_expired(&self, session: &CheckoutSession) {
        info!(
            session_id = %session.id,
            customer_email = session.customer_email.as_deref().unwrap_or("unknown"),
            "checkout session expired"
        );
    }

    /// Mark the license paid with a failed payment intent as failed and inactive.
    ///
    /// Returns `None` when no license references the payment intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository fails.
    pub async fn handle_payment_failed(
        &self,
        failed: &FailedPayment,
    ) -> Result<Option<License>, PaymentError> {
        let Some(license) = self
            .licenses
            .find_by_payment_intent(&failed.payment_intent)
            .await?
        else {
            warn!(
                payment_intent = %failed.payment_intent,
                "payment failed for unknown payment intent"
            );
            return Ok(None);
        };

        let updated = self
            .licenses
            .update_payment_status(license.id, PaymentStatus::Failed, false)
            .await?;

        warn!(
            license_id = %updated.id,
            payment_intent = %failed.payment_intent,
            reason = failed.failure_message.as_deref().unwrap_or("unspecified"),
            "license deactivated after failed payment"
        );

        Ok(Some(updated))
    }
}
