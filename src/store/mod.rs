// src/store/mod.rs
//
// Persistence boundary for purchase records. The store exclusively owns
// record lifecycle: creation happens only through the idempotent
// `create_purchase`, the download counter moves only through the atomic
// `record_download`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{NewPurchase, PurchaseRecord};

#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Create-if-absent keyed on the provider session handle. Redelivered
    /// webhook events return the already-stored record instead of creating
    /// a duplicate.
    async fn create_purchase(&self, new: NewPurchase) -> Result<PurchaseRecord, Error>;

    async fn get(&self, purchase_id: &str) -> Result<Option<PurchaseRecord>, Error>;

    async fn get_by_session(&self, session_id: &str) -> Result<Option<PurchaseRecord>, Error>;

    async fn list_by_email(&self, email: &str) -> Result<Vec<PurchaseRecord>, Error>;

    /// Atomic check-and-increment of the download counter. Concurrent calls
    /// against the last remaining slot yield exactly one success; the rest
    /// see `LimitExceeded`. A download at `now == expires_at` is still
    /// valid; one second later it is `Expired`.
    async fn record_download(
        &self,
        purchase_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRecord, Error>;
}
