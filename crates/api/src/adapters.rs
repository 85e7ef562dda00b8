//! Outbound provider adapters for the payment flow.

use std::sync::Arc;
use std::time::Duration;

use ona_core::payments::{EmailSender, MagicLinkProvider, PaymentError};
use ona_shared::{EmailService, IdentityConfig, OutgoingEmail};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Sends payment emails through the SMTP [`EmailService`].
#[derive(Clone)]
pub struct SmtpEmailSender {
    email: Arc<EmailService>,
}

impl SmtpEmailSender {
    /// Wrap an email service.
    #[must_use]
    pub fn new(email: Arc<EmailService>) -> Self {
        Self { email }
    }
}

impl EmailSender for SmtpEmailSender {
    async fn send_email(&self, email: OutgoingEmail) -> Result<(), PaymentError> {
        self.email
            .send_email(&email)
            .await
            .map_err(|e| PaymentError::Email(e.to_string()))
    }
}

#[derive(Serialize)]
struct MagicLinkRequest<'a> {
    email: &'a str,
    #[serde(rename = "callbackURL")]
    callback_url: String,
    #[serde(rename = "newUserCallbackURL")]
    new_user_callback_url: String,
    #[serde(rename = "errorCallbackURL")]
    error_callback_url: String,
}

#[derive(Deserialize)]
struct MagicLinkResponse {
    url: Option<String>,
}

/// Mints sign-in links through the identity provider's magic-link endpoint.
#[derive(Clone)]
pub struct HttpMagicLinkProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    frontend_url: String,
}

impl HttpMagicLinkProvider {
    /// Build a provider from identity settings.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "failed to build identity HTTP client, using default");
                reqwest::Client::default()
            });

        Self {
            client,
            endpoint: format!(
                "{}/sign-in/magic-link",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

impl MagicLinkProvider for HttpMagicLinkProvider {
    async fn create_magic_link(&self, email: &str) -> Result<String, PaymentError> {
        let body = MagicLinkRequest {
            email,
            callback_url: format!("{}/dashboard", self.frontend_url),
            new_user_callback_url: format!("{}/welcome", self.frontend_url),
            error_callback_url: format!("{}/login?error=magic-link", self.frontend_url),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        debug!(endpoint = %self.endpoint, "requesting magic link");
        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::MagicLink(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::MagicLink(format!(
                "identity provider returned {status}"
            )));
        }

        let parsed: MagicLinkResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::MagicLink(e.to_string()))?;

        parsed
            .url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| PaymentError::MagicLink("response has no url".into()))
    }
}
