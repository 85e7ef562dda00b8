//! Payment, license and customer types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ona_shared::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PaymentError;

/// License tier sold at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseTier {
    /// Individual license.
    Pro,
    /// Small team license.
    Team,
    /// Organisation-wide license.
    Enterprise,
}

impl LicenseTier {
    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Team => "team",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pro" => Some(Self::Pro),
            "team" => Some(Self::Team),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }

    /// Human-readable name for emails.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pro => "Pro",
            Self::Team => "Team",
            Self::Enterprise => "Enterprise",
        }
    }
}

/// Payment state of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment.
    Pending,
    /// Paid in full.
    Paid,
    /// Payment failed.
    Failed,
    /// Refunded.
    Refunded,
}

impl PaymentStatus {
    /// Convert to database string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parse from database string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// A marketplace account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// User ID.
    pub id: Uuid,
    /// Email, lowercased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
    /// Whether the email has been verified.
    pub email_verified: bool,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Email, lowercased.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: Role,
    /// Whether the email has been verified.
    pub email_verified: bool,
}

/// A purchased license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    /// License ID.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Human-facing key, `ONA-XXXX-XXXX-XXXX-XXXX`.
    pub license_key: String,
    /// Tier.
    pub tier: LicenseTier,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Stripe payment intent ID.
    pub stripe_payment_intent_id: Option<String>,
    /// Stripe checkout session ID.
    pub stripe_checkout_session_id: Option<String>,
    /// Amount paid in minor units.
    pub amount_cents: i64,
    /// ISO 4217 currency, lowercase.
    pub currency: String,
    /// Never expires.
    pub is_lifetime: bool,
    /// Grants access to premium components.
    pub is_active: bool,
    /// Free-form note.
    pub notes: Option<String>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
    /// Updated timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLicenseInput {
    /// Owner.
    pub user_id: Uuid,
    /// Generated license key.
    pub license_key: String,
    /// Tier.
    pub tier: LicenseTier,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Stripe payment intent ID.
    pub stripe_payment_intent_id: Option<String>,
    /// Stripe checkout session ID.
    pub stripe_checkout_session_id: Option<String>,
    /// Amount paid in minor units.
    pub amount_cents: i64,
    /// ISO 4217 currency, lowercase.
    pub currency: String,
    /// Never expires.
    pub is_lifetime: bool,
    /// Grants access to premium components.
    pub is_active: bool,
    /// Free-form note.
    pub notes: Option<String>,
}

/// The fields of a completed or expired Stripe checkout session we act on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Checkout session ID (`cs_...`).
    pub id: String,
    /// Payment intent ID (`pi_...`), absent for unpaid sessions.
    pub payment_intent: Option<String>,
    /// Customer email.
    pub customer_email: Option<String>,
    /// Total charged in minor units.
    pub amount_total: Option<i64>,
    /// ISO 4217 currency.
    pub currency: Option<String>,
    /// Session metadata (`tier` overrides the amount-based tier).
    pub metadata: HashMap<String, String>,
}

/// A failed payment intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedPayment {
    /// Payment intent ID.
    pub payment_intent: String,
    /// Provider's failure message.
    pub failure_message: Option<String>,
}

/// Outcome of processing a completed checkout. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProcessingResult {
    /// Whether the license was provisioned.
    pub success: bool,
    /// Resolved user.
    pub user_id: Option<Uuid>,
    /// Created license.
    pub license_id: Option<Uuid>,
    /// Created license key.
    pub license_key: Option<String>,
    /// Whether the user was created by this payment.
    pub is_new_user: bool,
    /// Whether the welcome email went out.
    pub magic_link_sent: bool,
    /// Failure description.
    pub error: Option<String>,
    /// Machine-readable failure code.
    pub error_code: Option<String>,
}

impl PaymentProcessingResult {
    /// Successful provisioning.
    #[must_use]
    pub fn success(user: &User, license: &License, is_new_user: bool, magic_link_sent: bool) -> Self {
        Self {
            success: true,
            user_id: Some(user.id),
            license_id: Some(license.id),
            license_key: Some(license.license_key.clone()),
            is_new_user,
            magic_link_sent,
            error: None,
            error_code: None,
        }
    }

    /// Failed provisioning.
    #[must_use]
    pub fn failure(err: &PaymentError) -> Self {
        Self {
            success: false,
            user_id: None,
            license_id: None,
            license_key: None,
            is_new_user: false,
            magic_link_sent: false,
            error: Some(err.to_string()),
            error_code: Some(err.code().to_string()),
        }
    }

    /// Whether the failure was a replayed payment.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.error_code.as_deref() == Some(PaymentError::DUPLICATE_CODE)
    }
}

/// What a webhook event resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A checkout was processed (successfully or not).
    Checkout(PaymentProcessingResult),
    /// An abandoned checkout was acknowledged.
    CheckoutExpired,
    /// A failed payment was recorded against its license, if any.
    PaymentFailed {
        /// License marked failed.
        license_id: Option<Uuid>,
    },
    /// Event type we do not handle.
    Ignored(String),
}
