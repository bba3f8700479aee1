// src/api/workspaces.rs

use actix_web::{get, web, HttpResponse, Responder};

use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/workspaces",
    tag = "catalog",
    responses(
        (status = 200, description = "All purchasable workflow templates", body = [crate::catalog::CatalogItem])
    )
)]
#[get("/api/workspaces")]
pub async fn list_workspaces(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.catalog.items())
}
