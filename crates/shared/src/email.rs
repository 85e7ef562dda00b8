//! Email service for sending transactional emails.
//!
//! Uses `lettre` for SMTP transport.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// A rendered transactional email with HTML and plain-text bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Recipient display name.
    pub to_name: Option<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_content: String,
    /// Plain-text body.
    pub text_content: String,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        // Unauthenticated relays (local catchers) get a plain connection.
        let builder = if self.config.smtp_username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| EmailError::SendError(e.to_string()))?
                .credentials(Credentials::new(
                    self.config.smtp_username.clone(),
                    self.config.smtp_password.clone(),
                ))
        };

        Ok(builder.port(self.config.smtp_port).build())
    }

    /// Builds the MIME message for an outgoing email.
    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);
        let from: Mailbox = from
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?;

        let to_address = email
            .to
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?;
        let to = Mailbox::new(email.to_name.clone(), to_address);

        Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(MultiPart::alternative_plain_html(
                email.text_content.clone(),
                email.html_content.clone(),
            ))
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }

    /// Sends an email with both HTML and plain-text parts.
    ///
    /// # Errors
    ///
    /// Returns an error if an address is invalid or the SMTP exchange fails.
    pub async fn send_email(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build_message(email)?;

        let transport = self.create_transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        tracing::debug!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            to_name: Some("Jane Smith".to_string()),
            subject: "Welcome to Ona UI".to_string(),
            html_content: "<p>Hello</p>".to_string(),
            text_content: "Hello".to_string(),
        }
    }

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }

    #[test]
    fn test_build_message_has_both_parts() {
        let service = EmailService::new(EmailConfig::default());
        let message = service
            .build_message(&sample_email("jane@example.com"))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("Jane Smith"));
    }

    #[test]
    fn test_build_message_rejects_bad_address() {
        let service = EmailService::new(EmailConfig::default());
        let result = service.build_message(&sample_email("not-an-address"));
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[test]
    fn test_create_transport() {
        let service = EmailService::new(EmailConfig::default());
        assert!(service.create_transport().is_ok());
    }
}
