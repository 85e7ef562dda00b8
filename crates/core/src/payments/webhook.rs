//! Stripe webhook signature verification and event parsing.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::error::PaymentError;
use super::types::{CheckoutSession, FailedPayment};

type HmacSha256 = Hmac<Sha256>;

/// A parsed webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `checkout.session.completed`
    CheckoutSessionCompleted(CheckoutSession),
    /// `checkout.session.expired`
    CheckoutSessionExpired(CheckoutSession),
    /// `payment_intent.payment_failed`
    PaymentIntentFailed(FailedPayment),
    /// Any other event type.
    Unhandled(String),
}

/// Webhook envelope: event ID plus typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEnvelope {
    /// Event ID (`evt_...`).
    pub id: String,
    /// Parsed event.
    pub event: WebhookEvent,
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Deserialize)]
struct RawCheckoutSession {
    id: String,
    payment_intent: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<RawCustomerDetails>,
    amount_total: Option<i64>,
    currency: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct RawCustomerDetails {
    email: Option<String>,
}

#[derive(Deserialize)]
struct RawPaymentIntent {
    id: String,
    last_payment_error: Option<RawPaymentError>,
}

#[derive(Deserialize)]
struct RawPaymentError {
    message: Option<String>,
}

impl From<RawCheckoutSession> for CheckoutSession {
    fn from(raw: RawCheckoutSession) -> Self {
        let customer_email = raw
            .customer_details
            .and_then(|d| d.email)
            .or(raw.customer_email);
        Self {
            id: raw.id,
            payment_intent: raw.payment_intent,
            customer_email,
            amount_total: raw.amount_total,
            currency: raw.currency,
            metadata: raw.metadata.unwrap_or_default(),
        }
    }
}

/// Parse a webhook body.
///
/// # Errors
///
/// Returns `PaymentError::InvalidPayload` if the envelope or a handled
/// object does not match the expected shape.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEnvelope, PaymentError> {
    let raw: RawEvent =
        serde_json::from_slice(payload).map_err(|e| PaymentError::InvalidPayload(e.to_string()))?;

    let event = match raw.event_type.as_str() {
        "checkout.session.completed" => {
            WebhookEvent::CheckoutSessionCompleted(parse_object::<RawCheckoutSession>(raw.data.object)?.into())
        }
        "checkout.session.expired" => {
            WebhookEvent::CheckoutSessionExpired(parse_object::<RawCheckoutSession>(raw.data.object)?.into())
        }
        "payment_intent.payment_failed" => {
            let intent: RawPaymentIntent = parse_object(raw.data.object)?;
            WebhookEvent::PaymentIntentFailed(FailedPayment {
                payment_intent: intent.id,
                failure_message: intent.last_payment_error.and_then(|e| e.message),
            })
        }
        other => WebhookEvent::Unhandled(other.to_string()),
    };

    Ok(WebhookEnvelope { id: raw.id, event })
}

fn parse_object<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, PaymentError> {
    serde_json::from_value(value).map_err(|e| PaymentError::InvalidPayload(e.to_string()))
}

/// Verify a `Stripe-Signature` header.
///
/// The header is `t=<unix>,v1=<hex>[,v1=<hex>...]`; each `v1` is an
/// HMAC-SHA256 of `"{t}.{payload}"` keyed with the endpoint secret. The
/// timestamp must be within `tolerance_secs` of `now`.
///
/// # Errors
///
/// Returns `PaymentError::InvalidSignature` if the header is malformed,
/// stale, or no signature matches.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<(), PaymentError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".into()))?;
    if signatures.is_empty() {
        return Err(PaymentError::InvalidSignature("missing v1 signature".into()));
    }

    if now.abs_diff(timestamp) > tolerance_secs {
        return Err(PaymentError::InvalidSignature(
            "timestamp outside tolerance".into(),
        ));
    }

    let expected = compute_signature(payload, timestamp, secret)?;
    if signatures
        .iter()
        .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())))
    {
        Ok(())
    } else {
        Err(PaymentError::InvalidSignature("no matching signature".into()))
    }
}

fn compute_signature(payload: &[u8], timestamp: i64, secret: &str) -> Result<Vec<u8>, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Build a `Stripe-Signature` header for `payload`. Used to sign test
/// fixtures and local replays.
///
/// # Errors
///
/// Returns an error if the secret cannot key an HMAC.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, PaymentError> {
    let signature = compute_signature(payload, timestamp, secret)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(signature)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const NOW: i64 = 1_760_000_000;

    fn completed_payload() -> Vec<u8> {
        serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_1",
                    "object": "checkout.session",
                    "payment_intent": "pi_1",
                    "customer_email": null,
                    "customer_details": { "email": "Jane.Doe@Example.com", "name": "Jane" },
                    "amount_total": 25000,
                    "currency": "usd",
                    "metadata": { "tier": "team" }
                }
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_verify_valid_signature() {
        let payload = completed_payload();
        let header = sign_payload(&payload, SECRET, NOW).unwrap();
        assert!(verify_signature(&payload, &header, SECRET, 300, NOW + 10).is_ok());
    }

    #[test]
    fn test_verify_accepts_any_matching_v1() {
        let payload = completed_payload();
        let header = sign_payload(&payload, SECRET, NOW).unwrap();
        let header = format!("{header},v1={}", "00".repeat(32));
        assert!(verify_signature(&payload, &header, SECRET, 300, NOW).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_payload() {
        let payload = completed_payload();
        let header = sign_payload(&payload, SECRET, NOW).unwrap();
        let mut tampered = payload.clone();
        tampered.push(b' ');
        assert!(verify_signature(&tampered, &header, SECRET, 300, NOW).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_stale() {
        let payload = completed_payload();
        let header = sign_payload(&payload, "whsec_other", NOW).unwrap();
        assert!(verify_signature(&payload, &header, SECRET, 300, NOW).is_err());

        let header = sign_payload(&payload, SECRET, NOW).unwrap();
        assert!(verify_signature(&payload, &header, SECRET, 300, NOW + 301).is_err());
    }

    #[test]
    fn test_verify_rejects_malformed_header() {
        let payload = completed_payload();
        assert!(verify_signature(&payload, "", SECRET, 300, NOW).is_err());
        assert!(verify_signature(&payload, "t=abc,v1=zz", SECRET, 300, NOW).is_err());
        assert!(verify_signature(&payload, &format!("t={NOW}"), SECRET, 300, NOW).is_err());
    }

    #[test]
    fn test_parse_checkout_completed() {
        let envelope = parse_event(&completed_payload()).unwrap();
        assert_eq!(envelope.id, "evt_1");

        let WebhookEvent::CheckoutSessionCompleted(session) = envelope.event else {
            panic!("expected checkout.session.completed");
        };
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.payment_intent.as_deref(), Some("pi_1"));
        assert_eq!(session.customer_email.as_deref(), Some("Jane.Doe@Example.com"));
        assert_eq!(session.amount_total, Some(25_000));
        assert_eq!(session.metadata.get("tier").map(String::as_str), Some("team"));
    }

    #[test]
    fn test_parse_payment_failed() {
        let payload = serde_json::json!({
            "id": "evt_2",
            "type": "payment_intent.payment_failed",
            "data": { "object": {
                "id": "pi_9",
                "last_payment_error": { "message": "Your card was declined." }
            }}
        })
        .to_string();

        let envelope = parse_event(payload.as_bytes()).unwrap();
        assert_eq!(
            envelope.event,
            WebhookEvent::PaymentIntentFailed(FailedPayment {
                payment_intent: "pi_9".to_string(),
                failure_message: Some("Your card was declined.".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_unhandled_and_invalid() {
        let payload = r#"{"id":"evt_3","type":"customer.created","data":{"object":{}}}"#;
        assert_eq!(
            parse_event(payload.as_bytes()).unwrap().event,
            WebhookEvent::Unhandled("customer.created".to_string())
        );

        assert!(matches!(
            parse_event(b"not json"),
            Err(PaymentError::InvalidPayload(_))
        ));
        let missing_id = r#"{"id":"evt_4","type":"checkout.session.completed","data":{"object":{}}}"#;
        assert!(parse_event(missing_id.as_bytes()).is_err());
    }
}
