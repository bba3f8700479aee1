// src/api/entitlements.rs

use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::gate;
use crate::models::PurchaseRecord;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct EntitlementQuery {
    pub workspace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PurchasesQuery {
    pub email: Option<String>,
}

fn summary(state: &AppState, record: &PurchaseRecord) -> serde_json::Value {
    let mut body = serde_json::to_value(record).unwrap_or_else(|_| json!({}));
    body["purchaseId"] = json!(record.id);
    body["downloadUrl"] = json!(record.download_url());
    if let Some(item) = state.catalog.get(&record.workspace_id) {
        body["workspace"] = serde_json::to_value(item).unwrap_or(serde_json::Value::Null);
    }
    body
}

/// Entitlement query for a checkout session. A 404 here can simply mean
/// the webhook has not landed yet, so the body carries `"retry": true` and
/// clients are expected to poll briefly before treating it as a denial.
#[utoipa::path(
    get,
    path = "/api/purchase/{session_id}",
    tag = "purchases",
    params(
        ("session_id" = String, Path, description = "Checkout session handle"),
        ("workspace_id" = String, Query, description = "Workspace the purchase must cover")
    ),
    responses(
        (status = 200, description = "Paid, matching, unexpired purchase", body = PurchaseRecord),
        (status = 400, description = "Missing workspace_id"),
        (status = 403, description = "Purchase mismatched or expired"),
        (status = 404, description = "No purchase recorded yet")
    )
)]
#[get("/api/purchase/{session_id}")]
pub async fn get_purchase(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<EntitlementQuery>,
) -> Result<HttpResponse, Error> {
    let session_id = path.into_inner();
    let workspace_id = query
        .into_inner()
        .workspace_id
        .ok_or_else(|| Error::Validation("workspace_id query parameter required".to_string()))?;

    match gate::verify_entitlement(state.store.as_ref(), &session_id, &workspace_id, Utc::now())
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(summary(&state, &record))),
        Err(Error::NotFound(_)) => Ok(HttpResponse::NotFound().json(json!({
            "error": "purchase not found",
            "retry": true,
        }))),
        Err(e) => Err(e),
    }
}

/// Purchase history for a customer email.
#[get("/api/purchases")]
pub async fn list_purchases(
    state: web::Data<AppState>,
    query: web::Query<PurchasesQuery>,
) -> Result<HttpResponse, Error> {
    let email = query
        .into_inner()
        .email
        .ok_or_else(|| Error::Validation("email query parameter required".to_string()))?;

    let purchases = state.store.list_by_email(&email).await?;
    let purchases: Vec<serde_json::Value> =
        purchases.iter().map(|p| summary(&state, p)).collect();

    Ok(HttpResponse::Ok().json(json!({ "purchases": purchases })))
}
