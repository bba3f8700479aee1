// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::Error;
use crate::models::{NewPurchase, PurchaseRecord};

use super::PurchaseStore;

/// Postgres-backed store for multi-process deployments. Atomicity comes
/// from the database: `ON CONFLICT DO NOTHING` for idempotent creation and
/// a conditional `UPDATE .. RETURNING` for the counter.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

fn map_row(row: PgRow) -> PurchaseRecord {
    PurchaseRecord {
        id: row.get("id"),
        session_id: row.get("session_id"),
        workspace_id: row.get("workspace_id"),
        customer_email: row.get("customer_email"),
        amount_paid: row.get("amount_paid"),
        currency: row.get("currency"),
        purchased_at: row.get("purchased_at"),
        expires_at: row.get("expires_at"),
        download_count: row.get("download_count"),
        max_downloads: row.get("max_downloads"),
    }
}

const COLUMNS: &str = "id, session_id, workspace_id, customer_email, amount_paid, currency, \
                       purchased_at, expires_at, download_count, max_downloads";

#[async_trait]
impl PurchaseStore for PgStore {
    async fn create_purchase(&self, new: NewPurchase) -> Result<PurchaseRecord, Error> {
        let record = new.into_record();

        let inserted = sqlx::query(
            r#"INSERT INTO purchases
               (id, session_id, workspace_id, customer_email, amount_paid, currency,
                purchased_at, expires_at, download_count, max_downloads)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               ON CONFLICT (session_id) DO NOTHING
               RETURNING id"#,
        )
        .bind(&record.id)
        .bind(&record.session_id)
        .bind(&record.workspace_id)
        .bind(&record.customer_email)
        .bind(record.amount_paid)
        .bind(&record.currency)
        .bind(record.purchased_at)
        .bind(record.expires_at)
        .bind(record.download_count)
        .bind(record.max_downloads)
        .fetch_optional(&self.pool)
        .await?;

        if inserted.is_some() {
            return Ok(record);
        }

        // Redelivery: hand back the record the first delivery created.
        self.get_by_session(&record.session_id)
            .await?
            .ok_or_else(|| Error::Upstream("purchase vanished during idempotent create".to_string()))
    }

    async fn get(&self, purchase_id: &str) -> Result<Option<PurchaseRecord>, Error> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM purchases WHERE id = $1"))
            .bind(purchase_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(map_row))
    }

    async fn get_by_session(&self, session_id: &str) -> Result<Option<PurchaseRecord>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM purchases WHERE session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_row))
    }

    async fn list_by_email(&self, email: &str) -> Result<Vec<PurchaseRecord>, Error> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM purchases
             WHERE customer_email = $1
             ORDER BY purchased_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn record_download(
        &self,
        purchase_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PurchaseRecord, Error> {
        let updated = sqlx::query(&format!(
            "UPDATE purchases
             SET download_count = download_count + 1
             WHERE id = $1
               AND download_count < max_downloads
               AND expires_at >= $2
             RETURNING {COLUMNS}"
        ))
        .bind(purchase_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = updated {
            return Ok(map_row(row));
        }

        // The guarded update matched nothing; look again to say why.
        match self.get(purchase_id).await? {
            None => Err(Error::NotFound("purchase".to_string())),
            Some(record) if record.download_count >= record.max_downloads => {
                Err(Error::LimitExceeded)
            }
            Some(_) => Err(Error::Expired),
        }
    }
}
