// src/api/checkout.rs

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Error;
use crate::provider::CreateSessionRequest;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(rename = "workspaceId")]
    pub workspace_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// Opens a hosted checkout session for a catalog item. Price and title are
/// resolved from the catalog only; the request carries nothing but the id,
/// so a tampered client cannot change what is charged.
#[utoipa::path(
    post,
    path = "/api/checkout",
    tag = "checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout session created", body = CheckoutResponse),
        (status = 400, description = "Malformed request body"),
        (status = 404, description = "Unknown workspace"),
        (status = 500, description = "Provider failure or missing configuration")
    )
)]
#[post("/api/checkout")]
pub async fn create_checkout(
    state: web::Data<AppState>,
    payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, Error> {
    let item = state
        .catalog
        .get(&payload.workspace_id)
        .ok_or_else(|| Error::NotFound("workspace".to_string()))?;

    let session = state
        .provider
        .create_checkout_session(CreateSessionRequest {
            workspace_id: item.id.clone(),
            title: item.title.clone(),
            description: "n8n Automation Workspace - Instant Download".to_string(),
            unit_amount: item.price_cents,
            currency: "usd".to_string(),
            success_url: state.config.success_url(&item.id),
            cancel_url: state.config.cancel_url(&item.id),
        })
        .await?;

    log::info!(
        "checkout session created session_id={} workspace_id={}",
        session.id,
        item.id
    );

    Ok(HttpResponse::Ok().json(CheckoutResponse {
        session_id: session.id,
    }))
}
