// src/error.rs

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy shared by every component. Handlers propagate these with
/// `?`; the `ResponseError` impl turns them into client-facing JSON.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("purchase does not match this workspace")]
    Mismatch,

    #[error("download link has expired")]
    Expired,

    #[error("download limit exceeded")]
    LimitExceeded,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("missing configuration: {0}")]
    Config(&'static str),

    #[error("{0}")]
    Validation(String),
}

impl Error {
    /// Message safe to return to clients. Upstream and config failures are
    /// logged server-side with detail but collapsed to a generic message.
    fn client_message(&self) -> String {
        match self {
            Error::Upstream(_) => "payment provider error".to_string(),
            Error::Config(_) => "payment system not configured".to_string(),
            other => other.to_string(),
        }
    }
}

impl actix_web::ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Mismatch | Error::Expired | Error::LimitExceeded => StatusCode::FORBIDDEN,
            Error::InvalidSignature | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Error::Upstream(detail) => log::error!("upstream failure: {detail}"),
            Error::Config(what) => log::error!("misconfiguration: {what} is not set"),
            Error::InvalidSignature => log::warn!("webhook signature verification failed"),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(json!({ "error": self.client_message() }))
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Upstream(format!("database error: {e}"))
    }
}
