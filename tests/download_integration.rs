use actix_web::test::{self, TestRequest};
use actix_web::App;
use serde_json::{json, Value};

use workflow_market::api::checkout::create_checkout;
use workflow_market::api::downloads::download_workspace;
use workflow_market::api::entitlements::{get_purchase, list_purchases};
use workflow_market::api::webhooks::stripe_webhook;
use workflow_market::artifact::WorkflowArtifact;
use workflow_market::catalog::Catalog;

mod support;

/// Full purchase-entitlement-download pipeline against the fake provider:
/// checkout for item "1" (4900 cents), webhook confirmation, entitlement
/// query, five downloads, and a sixth that hits the limit.
#[actix_web::test]
async fn purchase_pipeline_end_to_end() {
    let (state, _store, _provider) = support::mock_state();
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(create_checkout)
            .service(stripe_webhook)
            .service(get_purchase)
            .service(download_workspace),
    )
    .await;

    // Checkout initiation returns a session handle.
    let req = TestRequest::post()
        .uri("/api/checkout")
        .set_json(json!({ "workspaceId": "1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    // Before the webhook lands the entitlement query asks the client to retry.
    let req = TestRequest::get()
        .uri(&format!("/api/purchase/{session_id}?workspace_id=1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["retry"], true);

    // Provider confirms the payment.
    let payload = support::completed_event(&session_id, "1", "buyer@example.com");
    let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
    assert!(resp.status().is_success());

    // Entitlement now verifies and hands out the download location.
    let req = TestRequest::get()
        .uri(&format!("/api/purchase/{session_id}?workspace_id=1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["downloadCount"], 0);
    assert_eq!(body["maxDownloads"], 5);
    assert_eq!(body["workspace"]["title"], "E-commerce Order Processing");
    let download_url = body["downloadUrl"].as_str().unwrap().to_string();

    // A mismatched workspace id is refused.
    let req = TestRequest::get()
        .uri(&format!("/api/purchase/{session_id}?workspace_id=2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);

    // Five downloads succeed, then the quota is spent.
    for attempt in 1..=5 {
        let req = TestRequest::get().uri(&download_url).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success(), "download #{attempt}");

        if attempt == 1 {
            let disposition = resp
                .headers()
                .get("Content-Disposition")
                .unwrap()
                .to_str()
                .unwrap()
                .to_string();
            assert_eq!(
                disposition,
                "attachment; filename=\"e-commerce-order-processing-v2.1.json\""
            );
            assert_eq!(
                resp.headers().get("Cache-Control").unwrap(),
                "no-cache, no-store, must-revalidate"
            );

            // The artifact re-imports to the same node/connection graph.
            let bytes = test::read_body(resp).await;
            let artifact: WorkflowArtifact = serde_json::from_slice(&bytes).unwrap();
            let catalog = Catalog::seed();
            let source = &catalog.get("1").unwrap().workflow;
            assert_eq!(artifact.nodes, source.nodes);
            assert_eq!(artifact.connections, source.connections);
            assert_eq!(artifact.version_id, "2.1");
        }
    }

    let req = TestRequest::get().uri(&download_url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "download limit exceeded");
}

#[actix_web::test]
async fn unknown_purchase_download_is_404() {
    let (state, _store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(download_workspace)).await;

    let req = TestRequest::get()
        .uri("/api/download/not-a-purchase")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn entitlement_query_requires_workspace_id() {
    let (state, _store, _provider) = support::mock_state();
    let app = test::init_service(App::new().app_data(state).service(get_purchase)).await;

    let req = TestRequest::get()
        .uri("/api/purchase/cs_test_whatever")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn purchase_history_lists_by_email() {
    let (state, _store, _provider) = support::mock_state();
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(stripe_webhook)
            .service(list_purchases),
    )
    .await;

    for (session, workspace) in [("cs_test_hist_1", "1"), ("cs_test_hist_2", "2")] {
        let payload = support::completed_event(session, workspace, "collector@example.com");
        let resp = test::call_service(&app, support::signed_webhook(&payload).to_request()).await;
        assert!(resp.status().is_success());
    }
    let other = support::completed_event("cs_test_hist_3", "1", "someone-else@example.com");
    test::call_service(&app, support::signed_webhook(&other).to_request()).await;

    let req = TestRequest::get()
        .uri("/api/purchases?email=collector@example.com")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    let purchases = body["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 2);
    for purchase in purchases {
        assert!(purchase["downloadUrl"].as_str().unwrap().starts_with("/api/download/"));
    }

    let req = TestRequest::get().uri("/api/purchases").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}
