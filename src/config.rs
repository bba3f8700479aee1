// src/config.rs

use std::env;

/// Environment-driven configuration. Missing payment credentials degrade
/// the affected endpoints to a config error response instead of preventing
/// startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stripe_secret_key: Option<String>,
    pub webhook_secret: Option<String>,
    pub public_base_url: String,
    pub database_url: Option<String>,
    pub payment_mock: bool,
    pub port: u16,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            stripe_secret_key: non_empty("STRIPE_SECRET_KEY"),
            webhook_secret: non_empty("STRIPE_WEBHOOK_SECRET"),
            public_base_url: non_empty("PUBLIC_BASE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            database_url: non_empty("DATABASE_URL"),
            payment_mock: non_empty("PAYMENT_MOCK").as_deref() == Some("true"),
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Redirect target Stripe substitutes the session id into after payment.
    pub fn success_url(&self, workspace_id: &str) -> String {
        format!(
            "{}/success?session_id={{CHECKOUT_SESSION_ID}}&workspace_id={}",
            self.public_base_url, workspace_id
        )
    }

    pub fn cancel_url(&self, workspace_id: &str) -> String {
        format!("{}/workspace/{}", self.public_base_url, workspace_id)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            stripe_secret_key: None,
            webhook_secret: None,
            public_base_url: "http://localhost:8080".to_string(),
            database_url: None,
            payment_mock: false,
            port: 8080,
        }
    }
}
