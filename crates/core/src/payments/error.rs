//! Payment error types.

use thiserror::Error;

/// Payment processing errors.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A license already exists for this payment.
    #[error("payment already processed: {reference}")]
    Duplicate {
        /// Payment intent or checkout session ID.
        reference: String,
    },

    /// The checkout session has no customer email.
    #[error("checkout session {session_id} has no customer email")]
    MissingCustomerEmail {
        /// Checkout session ID.
        session_id: String,
    },

    /// Stripe-Signature header missing, malformed or wrong.
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Webhook body could not be parsed.
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Identity provider did not return a magic link.
    #[error("magic link generation failed: {0}")]
    MagicLink(String),

    /// Email delivery failed.
    #[error("email delivery failed: {0}")]
    Email(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PaymentError {
    /// Code reported for replayed payments.
    pub const DUPLICATE_CODE: &'static str = "DUPLICATE_PAYMENT";

    /// Create a duplicate payment error.
    #[must_use]
    pub fn duplicate(reference: impl Into<String>) -> Self {
        Self::Duplicate {
            reference: reference.into(),
        }
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => Self::DUPLICATE_CODE,
            Self::MissingCustomerEmail { .. } => "MISSING_CUSTOMER_EMAIL",
            Self::InvalidSignature(_) => "INVALID_SIGNATURE",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::MagicLink(_) => "MAGIC_LINK_FAILED",
            Self::Email(_) => "EMAIL_FAILED",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}
