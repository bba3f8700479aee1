// src/gate.rs
//
// Entitlement verification and the download gate. Both operate on the
// store through its atomicity contract; neither constructs or mutates
// records directly.

use chrono::{DateTime, Utc};

use crate::artifact::{render_download, DownloadFile};
use crate::catalog::Catalog;
use crate::error::Error;
use crate::models::PurchaseRecord;
use crate::store::PurchaseStore;

/// Checks that a paid, matching, unexpired purchase exists for the session.
/// Read-only; `NotFound` also covers "webhook not yet processed", which the
/// HTTP layer surfaces as retryable.
pub async fn verify_entitlement(
    store: &dyn PurchaseStore,
    session_id: &str,
    workspace_id: &str,
    now: DateTime<Utc>,
) -> Result<PurchaseRecord, Error> {
    let record = store
        .get_by_session(session_id)
        .await?
        .ok_or_else(|| Error::NotFound("purchase".to_string()))?;

    if record.workspace_id != workspace_id {
        return Err(Error::Mismatch);
    }
    if now > record.expires_at {
        return Err(Error::Expired);
    }

    Ok(record)
}

/// Releases the purchased artifact, consuming one download slot. The
/// artifact is assembled before the counter moves, so a failed assembly
/// never burns a slot; the store's atomic increment re-checks limit and
/// expiry, which is what keeps two racing requests from both passing the
/// last slot.
pub async fn download(
    store: &dyn PurchaseStore,
    catalog: &Catalog,
    purchase_id: &str,
    now: DateTime<Utc>,
) -> Result<DownloadFile, Error> {
    let record = store
        .get(purchase_id)
        .await?
        .ok_or_else(|| Error::NotFound("purchase".to_string()))?;

    if record.download_count >= record.max_downloads {
        return Err(Error::LimitExceeded);
    }
    if now > record.expires_at {
        return Err(Error::Expired);
    }

    let item = catalog
        .get(&record.workspace_id)
        .ok_or_else(|| Error::NotFound("workspace file".to_string()))?;

    let file = render_download(item, now)?;
    let updated = store.record_download(purchase_id, now).await?;
    log::info!(
        "download served purchase_id={} workspace_id={} count={}/{}",
        updated.id,
        updated.workspace_id,
        updated.download_count,
        updated.max_downloads
    );

    Ok(file)
}
