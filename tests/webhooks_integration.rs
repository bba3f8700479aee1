use std::sync::Arc;

use actix_web::test::{self, TestRequest};
use actix_web::{web, App};
use serde_json::{json, Value};

use workflow_market::api::webhooks::stripe_webhook;
use workflow_market::catalog::Catalog;
use workflow_market::config::AppConfig;
use workflow_market::provider::MockProvider;
use workflow_market::store::{MemoryStore, PurchaseStore};
use workflow_market::AppState;

mod support;

#[actix_web::test]
async fn completed_event_creates_a_purchase() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = support::completed_event("cs_test_live_1", "1", "buyer@example.com");
    let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["received"], true);

    let record = store
        .get_by_session("cs_test_live_1")
        .await
        .unwrap()
        .expect("purchase recorded");
    assert_eq!(record.workspace_id, "1");
    assert_eq!(record.customer_email, "buyer@example.com");
    assert_eq!(record.amount_paid, 4900);
    assert_eq!(record.download_count, 0);
    assert_eq!(record.max_downloads, 5);
}

#[actix_web::test]
async fn invalid_signature_creates_nothing() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = support::completed_event("cs_test_live_2", "1", "buyer@example.com");
    let body = serde_json::to_vec(&payload).unwrap();
    let req = TestRequest::post()
        .uri("/webhook/stripe")
        .insert_header(("Stripe-Signature", "t=1700000000,v1=deadbeef"))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid signature");
    assert!(store
        .get_by_session("cs_test_live_2")
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn missing_signature_header_is_rejected() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = support::completed_event("cs_test_live_3", "1", "buyer@example.com");
    let req = TestRequest::post()
        .uri("/webhook/stripe")
        .set_payload(serde_json::to_vec(&payload).unwrap())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(store
        .get_by_session("cs_test_live_3")
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn redelivered_event_does_not_duplicate_the_purchase() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = support::completed_event("cs_test_live_4", "1", "buyer@example.com");
    for _ in 0..2 {
        let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
        assert!(resp.status().is_success());
    }

    let purchases = store.list_by_email("buyer@example.com").await.unwrap();
    assert_eq!(purchases.len(), 1);
}

#[actix_web::test]
async fn event_without_metadata_is_acked_without_a_record() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = json!({
        "id": "evt_test_2",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_live_5",
                "amount_total": 4900,
                "currency": "usd",
                "customer_details": { "email": "buyer@example.com" },
            }
        }
    });

    let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
    assert!(resp.status().is_success());
    assert!(store
        .get_by_session("cs_test_live_5")
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn unrelated_event_kinds_are_acked() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = json!({
        "id": "evt_test_3",
        "type": "payment_intent.payment_failed",
        "data": { "object": { "id": "pi_test_1" } }
    });

    let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
    assert!(resp.status().is_success());
    assert!(store.list_by_email("buyer@example.com").await.unwrap().is_empty());
}

#[actix_web::test]
async fn unknown_workspace_in_metadata_is_acked_without_a_record() {
    let (state, store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = support::completed_event("cs_test_live_6", "999", "buyer@example.com");
    let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
    assert!(resp.status().is_success());
    assert!(store
        .get_by_session("cs_test_live_6")
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn missing_webhook_secret_degrades_to_config_error() {
    let store: Arc<dyn PurchaseStore> = Arc::new(MemoryStore::new());
    let state = web::Data::new(AppState {
        catalog: Catalog::seed(),
        store,
        provider: Arc::new(MockProvider::new()),
        config: AppConfig::default(),
    });
    let app = test::init_service(App::new().app_data(state).service(stripe_webhook)).await;

    let payload = support::completed_event("cs_test_live_7", "1", "buyer@example.com");
    let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;

    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "payment system not configured");
}
