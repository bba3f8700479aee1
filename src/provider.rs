// src/provider.rs
//
// Capability interface over the external payment provider's hosted
// checkout. The real implementation speaks the Stripe Checkout API;
// the mock is injected through configuration for development and tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Error;

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the provider needs to open a hosted session. Title and unit
/// amount always come from the catalog, never from the client.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub workspace_id: String,
    pub title: String,
    pub description: String,
    pub unit_amount: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        req: CreateSessionRequest,
    ) -> Result<ProviderSession, Error>;
}

/// Stripe hosted checkout over the form-encoded v1 API.
pub struct StripeCheckout {
    secret_key: Option<String>,
    http: reqwest::Client,
    api_base: String,
}

impl StripeCheckout {
    /// Builds the provider client once, with the bounded request timeout
    /// every upstream call relies on. A client that cannot be constructed
    /// is a startup failure, not something to paper over.
    pub fn new(secret_key: Option<String>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| Error::Upstream(format!("http client construction failed: {e}")))?;

        Ok(StripeCheckout {
            secret_key,
            http,
            api_base: STRIPE_API_BASE.to_string(),
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeCheckout {
    async fn create_checkout_session(
        &self,
        req: CreateSessionRequest,
    ) -> Result<ProviderSession, Error> {
        let key = self
            .secret_key
            .as_deref()
            .ok_or(Error::Config("STRIPE_SECRET_KEY"))?;

        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][price_data][currency]", req.currency),
            ("line_items[0][price_data][product_data][name]", req.title),
            (
                "line_items[0][price_data][product_data][description]",
                req.description,
            ),
            (
                "line_items[0][price_data][unit_amount]",
                req.unit_amount.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", req.success_url),
            ("cancel_url", req.cancel_url),
            ("metadata[workspaceId]", req.workspace_id),
        ];

        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(key)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("stripe request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Upstream(format!("stripe response read failed: {e}")))?;

        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "stripe api error status={} body={}",
                status.as_u16(),
                body
            )));
        }

        serde_json::from_str::<ProviderSession>(&body)
            .map_err(|e| Error::Upstream(format!("stripe invalid response: {e}; body={body}")))
    }
}

/// Test double. Hands out `cs_test_mock_` session handles and records how
/// many times it was called.
#[derive(Default)]
pub struct MockProvider {
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn create_checkout_session(
        &self,
        req: CreateSessionRequest,
    ) -> Result<ProviderSession, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("cs_test_mock_{}", Uuid::new_v4().simple());
        log::info!(
            "mock checkout session created id={} workspace_id={}",
            id,
            req.workspace_id
        );
        Ok(ProviderSession { id, url: None })
    }
}
