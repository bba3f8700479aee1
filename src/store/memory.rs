// src/store/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{NewPurchase, PurchaseRecord};

use super::PurchaseStore;

/// In-process store for single-node deployments and tests. A single mutex
/// serializes every read-modify-write, which is what gives the counter and
/// create-if-absent their atomicity.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, PurchaseRecord>,
    session_index: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned() -> Error {
    Error::Upstream("purchase store lock poisoned".to_string())
}

#[async_trait]
impl PurchaseStore for MemoryStore {
    async fn create_purchase(&self, new: NewPurchase) -> Result<PurchaseRecord, Error> {
        let mut inner = self.inner.lock().map_err(|_| lock_poisoned())?;
        if let Some(id) = inner.session_index.get(&new.session_id) {
            let existing = inner.by_id[id].clone();
            return Ok(existing);
        }

        let record = new.into_record();
        inner
            .session_index
            .insert(record.session_id.clone(), record.id.clone());
        inner.by_id.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get(&self, purchase_id: &str) -> Result<Option<PurchaseRecord>, Error> {
        let inner = self.inner.lock().map_err(|_| lock_poisoned())?;
        Ok(inner.by_id.get(purchase_id).cloned())
    }

    async fn get_by_session(&self, session_id: &str) -> Result<Option<PurchaseRecord>, Error> {
        let inner = self.inner.lock().map_err(|_| lock_poisoned())?;
        Ok(inner
            .session_index
            .get(session_id)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<PurchaseRecord>, Error> {
        let inner = self.inner.lock().map_err(|_| lock_poisoned())?;
        let mut purchases: Vec<PurchaseRecord> = inner
            .by_id
            .values()
            .filter(|p| p.customer_email == email)
            .cloned()
            .collect();
        purchases.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(purchases)
    }

    async fn record_download(
        &self,
        purchase_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRecord, Error> {
        let mut inner = self.inner.lock().map_err(|_| lock_poisoned())?;
        let record = inner
            .by_id
            .get_mut(purchase_id)
            .ok_or_else(|| Error::NotFound("purchase".to_string()))?;

        if record.download_count >= record.max_downloads {
            return Err(Error::LimitExceeded);
        }
        if now > record.expires_at {
            return Err(Error::Expired);
        }

        record.download_count += 1;
        Ok(record.clone())
    }
}
