pub mod api;
pub mod artifact;
pub mod catalog;
pub mod config;
pub mod docs;
pub mod error;
pub mod gate;
pub mod models;
pub mod provider;
pub mod store;

use std::sync::Arc;

use catalog::Catalog;
use config::AppConfig;
use provider::PaymentProvider;
use store::PurchaseStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub store: Arc<dyn PurchaseStore>,
    pub provider: Arc<dyn PaymentProvider>,
    pub config: AppConfig,
}
