// src/main.rs

use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use dotenvy::dotenv;
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use workflow_market::catalog::Catalog;
use workflow_market::config::AppConfig;
use workflow_market::provider::{MockProvider, PaymentProvider, StripeCheckout};
use workflow_market::store::{MemoryStore, PgStore, PurchaseStore};
use workflow_market::{api, docs, AppState};

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Service ready!")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();

    let store: Arc<dyn PurchaseStore> = match &config.database_url {
        Some(url) => {
            let pool = PgPool::connect(url)
                .await
                .map_err(|e| std::io::Error::other(format!("failed to connect to DB: {e}")))?;
            sqlx::migrate!()
                .run(&pool)
                .await
                .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            log::warn!("DATABASE_URL not set, purchases are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let provider: Arc<dyn PaymentProvider> = if config.payment_mock {
        log::warn!("PAYMENT_MOCK=true, using the fake payment provider");
        Arc::new(MockProvider::new())
    } else {
        if config.stripe_secret_key.is_none() {
            log::warn!("STRIPE_SECRET_KEY not set, checkout will answer with a config error");
        }
        let stripe = StripeCheckout::new(config.stripe_secret_key.clone())
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Arc::new(stripe)
    };

    if config.webhook_secret.is_none() {
        log::warn!("STRIPE_WEBHOOK_SECRET not set, webhooks will answer with a config error");
    }

    let port = config.port;
    let state = web::Data::new(AppState {
        catalog: Catalog::seed(),
        store,
        provider,
        config,
    });

    log::info!("listening on 0.0.0.0:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(api::json_error_config())
            .route("/", web::get().to(index))
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .service(api::workspaces::list_workspaces)
            .service(api::checkout::create_checkout)
            .service(api::entitlements::get_purchase)
            .service(api::entitlements::list_purchases)
            .service(api::downloads::download_workspace)
            .service(api::webhooks::stripe_webhook)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
