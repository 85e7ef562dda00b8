//! Router tests for Stripe webhook ingestion.

mod common;

use axum::body::Body;
use axum::http::StatusCode;
use chrono::Utc;
use common::{TestApp, WEBHOOK_SECRET, request, spawn_app, spawn_app_with_secret};
use ona_core::payments::webhook::sign_payload;
use ona_core::payments::{LicenseRepository, LicenseTier, UserRepository};
use ona_db::{LicenseStore, UserStore};
use serde_json::{Value, json};

fn checkout_event(session_id: &str, payment_intent: &str, email: &str, amount: i64) -> Value {
    json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "payment_intent": payment_intent,
                "customer_details": { "email": email },
                "amount_total": amount,
                "currency": "usd",
                "metadata": {}
            }
        }
    })
}

async fn deliver(app: &TestApp, payload: &Value, signature: Option<String>) -> (StatusCode, Value) {
    let body = payload.to_string();
    let mut req = request("POST", "/api/v1/webhooks/stripe", None, Body::from(body));
    if let Some(signature) = signature {
        req.headers_mut()
            .insert("stripe-signature", signature.parse().unwrap());
    }
    app.send(req).await
}

fn sign(payload: &Value) -> String {
    sign_payload(payload.to_string().as_bytes(), WEBHOOK_SECRET, Utc::now().timestamp()).unwrap()
}

#[tokio::test]
async fn test_checkout_provisions_user_and_license() {
    let app = spawn_app().await;
    let event = checkout_event("cs_test_1", "pi_test_1", "Buyer@Example.com", 15_000);

    let (status, body) = deliver(&app, &event, Some(sign(&event))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(body["result"]["success"], true);
    assert_eq!(body["result"]["isNewUser"], true);
    // No identity provider is reachable in tests
    assert_eq!(body["result"]["magicLinkSent"], false);

    let user = UserStore::new(app.db.clone())
        .find_by_email("buyer@example.com")
        .await
        .unwrap()
        .expect("user created");
    assert_eq!(user.name, "Buyer");

    let license = LicenseStore::new(app.db.clone())
        .find_by_payment_intent("pi_test_1")
        .await
        .unwrap()
        .expect("license created");
    assert_eq!(license.user_id, user.id);
    assert_eq!(license.tier, LicenseTier::Pro);
    assert!(license.is_active);
}

#[tokio::test]
async fn test_replayed_checkout_is_acknowledged() {
    let app = spawn_app().await;
    let event = checkout_event("cs_test_2", "pi_test_2", "buyer@example.com", 5_000);

    let (status, _) = deliver(&app, &event, Some(sign(&event))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = deliver(&app, &event, Some(sign(&event))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicate"], true);

    let licenses = LicenseStore::new(app.db.clone())
        .list_for_user(
            UserStore::new(app.db.clone())
                .find_by_email("buyer@example.com")
                .await
                .unwrap()
                .unwrap()
                .id,
        )
        .await
        .unwrap();
    assert_eq!(licenses.len(), 1);
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let app = spawn_app().await;
    let event = checkout_event("cs_test_3", "pi_test_3", "buyer@example.com", 5_000);

    let (status, body) = deliver(&app, &event, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_tampered_payload_is_rejected() {
    let app = spawn_app().await;
    let event = checkout_event("cs_test_4", "pi_test_4", "buyer@example.com", 5_000);
    let signature = sign(&event);
    let tampered = checkout_event("cs_test_4", "pi_test_4", "attacker@example.com", 5_000);

    let (status, _) = deliver(&app, &tampered, Some(signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let user = UserStore::new(app.db.clone())
        .find_by_email("attacker@example.com")
        .await
        .unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn test_checkout_without_email_returns_server_error() {
    let app = spawn_app().await;
    let event = json!({
        "id": "evt_no_email",
        "type": "checkout.session.completed",
        "data": { "object": { "id": "cs_no_email", "payment_intent": "pi_no_email", "amount_total": 5000 } }
    });

    let (status, body) = deliver(&app, &event, Some(sign(&event))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn test_unhandled_event_is_acknowledged() {
    let app = spawn_app().await;
    let event = json!({
        "id": "evt_other",
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    });

    let (status, body) = deliver(&app, &event, Some(sign(&event))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn test_unconfigured_secret_is_server_error() {
    let app = spawn_app_with_secret("").await;
    let event = checkout_event("cs_test_5", "pi_test_5", "buyer@example.com", 5_000);

    let (status, body) = deliver(&app, &event, Some(sign(&event))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "INTERNAL_ERROR");
}
