// src/models.rs

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Downloads allowed per purchase.
pub const MAX_DOWNLOADS: i32 = 5;

/// Days a purchase stays downloadable after payment.
pub const RETENTION_DAYS: i64 = 30;

/// Durable proof of a completed purchase. Created only by the webhook
/// (through the store's idempotent create); mutated only by the download
/// gate's atomic increment.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub session_id: String,
    pub workspace_id: String,
    pub customer_email: String,
    pub amount_paid: i64,
    pub currency: String,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub download_count: i32,
    pub max_downloads: i32,
}

impl PurchaseRecord {
    pub fn download_url(&self) -> String {
        format!("/api/download/{}", self.id)
    }
}

/// Input to `PurchaseStore::create_purchase`. The store derives the record
/// id, expiry and download quota.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub session_id: String,
    pub workspace_id: String,
    pub customer_email: String,
    pub amount_paid: i64,
    pub currency: String,
    pub purchased_at: DateTime<Utc>,
}

impl NewPurchase {
    pub fn into_record(self) -> PurchaseRecord {
        PurchaseRecord {
            id: Uuid::new_v4().to_string(),
            expires_at: self.purchased_at + Duration::days(RETENTION_DAYS),
            session_id: self.session_id,
            workspace_id: self.workspace_id,
            customer_email: self.customer_email,
            amount_paid: self.amount_paid,
            currency: self.currency,
            purchased_at: self.purchased_at,
            download_count: 0,
            max_downloads: MAX_DOWNLOADS,
        }
    }
}
