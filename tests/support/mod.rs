#![allow(dead_code)]

use std::sync::Arc;

use actix_web::test::TestRequest;
use actix_web::web;
use chrono::Utc;
use serde_json::json;

use workflow_market::api::webhooks::sign_payload;
use workflow_market::catalog::Catalog;
use workflow_market::config::AppConfig;
use workflow_market::provider::{MockProvider, PaymentProvider};
use workflow_market::store::{MemoryStore, PurchaseStore};
use workflow_market::AppState;

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn build_state(
    store: Arc<dyn PurchaseStore>,
    provider: Arc<dyn PaymentProvider>,
) -> web::Data<AppState> {
    web::Data::new(AppState {
        catalog: Catalog::seed(),
        store,
        provider,
        config: AppConfig {
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            ..AppConfig::default()
        },
    })
}

/// App state wired to the in-memory store and the fake payment provider,
/// with handles kept so tests can observe both.
pub fn mock_state() -> (web::Data<AppState>, Arc<MemoryStore>, Arc<MockProvider>) {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MockProvider::new());
    let state = build_state(store.clone(), provider.clone());
    (state, store, provider)
}

pub fn completed_event(session_id: &str, workspace_id: &str, email: &str) -> serde_json::Value {
    json!({
        "id": "evt_test_1",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": session_id,
                "amount_total": 4900,
                "currency": "usd",
                "payment_status": "paid",
                "customer_details": { "email": email },
                "metadata": { "workspaceId": workspace_id },
            }
        }
    })
}

/// Builds a webhook delivery with a signature the handler will accept.
pub fn signed_webhook(payload: &serde_json::Value) -> TestRequest {
    let body = serde_json::to_vec(payload).expect("serialize payload");
    let header = sign_payload(WEBHOOK_SECRET, &body, Utc::now().timestamp());
    TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header(("Stripe-Signature", header))
        .set_payload(body)
}
