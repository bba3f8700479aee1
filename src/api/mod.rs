pub mod checkout;
pub mod downloads;
pub mod entitlements;
pub mod workspaces;
pub mod webhooks;

use actix_web::web;

use crate::error::Error;

/// Extractor configuration mapping malformed JSON bodies into the shared
/// error taxonomy, so clients always see `{"error": ...}` instead of the
/// extractor's plain-text default.
pub fn json_error_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::Validation(format!("invalid request body: {err}")).into())
}
