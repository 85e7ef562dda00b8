//! Payment webhook ingestion.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use chrono::Utc;
use ona_core::payments::{PaymentError, WebhookOutcome, parse_event, verify_signature};
use ona_shared::AppError;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::{ApiError, ApiResult, AppState};

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Creates the webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/stripe", post(stripe_webhook))
}

/// POST `/webhooks/stripe`
///
/// Verifies the signature over the raw body before parsing anything.
/// Replayed payments are acknowledged with 200 so the provider stops
/// retrying; any other provisioning failure returns 500 so it retries.
async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if state.stripe.webhook_secret.is_empty() {
        return Err(ApiError(AppError::Internal(
            "webhook signing secret is not configured".into(),
        )));
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PaymentError::InvalidSignature("missing signature header".into()))?;

    verify_signature(
        &body,
        signature,
        &state.stripe.webhook_secret,
        state.stripe.signature_tolerance_secs,
        Utc::now().timestamp(),
    )?;

    let envelope = parse_event(&body)?;
    info!(event_id = %envelope.id, "webhook received");

    let outcome = state.payments.handle_event(envelope.event).await?;

    let response = match outcome {
        WebhookOutcome::Checkout(result) if result.success => (
            StatusCode::OK,
            Json(json!({ "received": true, "result": result })),
        ),
        WebhookOutcome::Checkout(result) if result.is_duplicate() => {
            warn!(event_id = %envelope.id, "duplicate checkout acknowledged");
            (
                StatusCode::OK,
                Json(json!({ "received": true, "duplicate": true })),
            )
        }
        WebhookOutcome::Checkout(result) => {
            error!(
                event_id = %envelope.id,
                error = result.error.as_deref().unwrap_or_default(),
                code = result.error_code.as_deref().unwrap_or_default(),
                "checkout provisioning failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "received": true,
                    "error": result.error_code,
                })),
            )
        }
        WebhookOutcome::PaymentFailed { license_id } => (
            StatusCode::OK,
            Json(json!({ "received": true, "licenseId": license_id })),
        ),
        WebhookOutcome::CheckoutExpired | WebhookOutcome::Ignored(_) => {
            (StatusCode::OK, Json(json!({ "received": true })))
        }
    };

    Ok(response)
}
