// src/api/downloads.rs

use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::error::Error;
use crate::gate;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/download/{purchase_id}",
    tag = "downloads",
    params(("purchase_id" = String, Path, description = "Purchase record id")),
    responses(
        (status = 200, description = "Workflow JSON attachment"),
        (status = 403, description = "Download limit exceeded or purchase expired"),
        (status = 404, description = "Purchase not found")
    )
)]
#[get("/api/download/{purchase_id}")]
pub async fn download_workspace(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let purchase_id = path.into_inner();
    let file = gate::download(
        state.store.as_ref(),
        &state.catalog,
        &purchase_id,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file.filename),
        ))
        .insert_header(("Cache-Control", "no-cache, no-store, must-revalidate"))
        .insert_header(("Pragma", "no-cache"))
        .insert_header(("Expires", "0"))
        .body(file.bytes))
}
