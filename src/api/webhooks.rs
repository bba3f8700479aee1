// src/api/webhooks.rs
//
// Stripe payment-confirmation webhook. The raw body is verified against
// the `Stripe-Signature` header before anything is parsed; unverified
// bodies must never reach the purchase store, or anyone could forge a
// purchase grant.

use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;

use crate::error::Error;
use crate::models::NewPurchase;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// How far a signed timestamp may drift before the event is rejected.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

const COMPLETED_EVENT: &str = "checkout.session.completed";

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: Option<std::collections::HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// Splits a `t=<unix>,v1=<hex>,..` header into the timestamp and the v1
/// signature candidates. Returns `None` on any malformed element.
pub fn parse_signature_header(header: &str) -> Option<(i64, Vec<String>)> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = Some(value.parse::<i64>().ok()?),
            "v1" => candidates.push(value.to_string()),
            _ => {}
        }
    }

    if candidates.is_empty() {
        return None;
    }
    Some((timestamp?, candidates))
}

/// Verifies `header` against `body` with the shared webhook secret:
/// HMAC-SHA256 over `"{t}.{body}"`, compared in constant time, with a
/// bounded timestamp drift.
pub fn verify_signature(secret: &str, header: &str, body: &[u8], now: i64) -> Result<(), Error> {
    let (timestamp, candidates) =
        parse_signature_header(header).ok_or(Error::InvalidSignature)?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(Error::InvalidSignature);
    }

    for candidate in &candidates {
        let Ok(decoded) = hex::decode(candidate) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| Error::InvalidSignature)?;
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(body);
        if mac.verify_slice(&decoded).is_ok() {
            return Ok(());
        }
    }

    Err(Error::InvalidSignature)
}

/// Test helper and reference for the provider's signing scheme.
pub fn sign_payload(secret: &str, body: &[u8], timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(body);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

#[post("/webhook/stripe")]
pub async fn stripe_webhook(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let secret = state
        .config
        .webhook_secret
        .as_deref()
        .ok_or(Error::Config("STRIPE_WEBHOOK_SECRET"))?;

    let header = req
        .headers()
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(Error::InvalidSignature)?;

    verify_signature(secret, header, &body, Utc::now().timestamp())?;

    let event: StripeEvent = serde_json::from_slice(&body).map_err(|e| {
        log::warn!("signed webhook body is not valid JSON: {e}");
        Error::InvalidSignature
    })?;

    if event.kind != COMPLETED_EVENT {
        log::info!("ignoring webhook event type={}", event.kind);
        return Ok(acknowledged());
    }

    let session: CheckoutSessionObject = match serde_json::from_value(event.data.object) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("checkout.session.completed with unreadable object: {e}");
            return Ok(acknowledged());
        }
    };

    let workspace_id = session
        .metadata
        .as_ref()
        .and_then(|m| m.get("workspaceId"))
        .cloned();
    let Some(workspace_id) = workspace_id else {
        log::warn!(
            "completed session without workspaceId metadata session_id={}",
            session.id
        );
        return Ok(acknowledged());
    };

    let email = session.customer_details.and_then(|c| c.email);
    let Some(email) = email else {
        log::warn!(
            "completed session without customer email session_id={}",
            session.id
        );
        return Ok(acknowledged());
    };

    let Some(item) = state.catalog.get(&workspace_id) else {
        log::warn!(
            "completed session references unknown workspace_id={} session_id={}",
            workspace_id,
            session.id
        );
        return Ok(acknowledged());
    };

    let new = NewPurchase {
        session_id: session.id.clone(),
        workspace_id: workspace_id.clone(),
        customer_email: email,
        amount_paid: session.amount_total.unwrap_or(item.price_cents),
        currency: session.currency.unwrap_or_else(|| "usd".to_string()),
        purchased_at: Utc::now(),
    };

    // A persistence failure after a valid signature is still acked: the
    // provider treats non-2xx as "retry forever".
    match state.store.create_purchase(new).await {
        Ok(record) => log::info!(
            "purchase recorded purchase_id={} session_id={} workspace_id={}",
            record.id,
            record.session_id,
            record.workspace_id
        ),
        Err(e) => log::error!(
            "failed to record purchase session_id={}: {e}",
            session.id
        ),
    }

    Ok(acknowledged())
}

fn acknowledged() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "received": true }))
}
