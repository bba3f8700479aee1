// src/docs.rs

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::workspaces::list_workspaces,
        crate::api::checkout::create_checkout,
        crate::api::entitlements::get_purchase,
        crate::api::downloads::download_workspace,
    ),
    components(schemas(
        crate::catalog::CatalogItem,
        crate::models::PurchaseRecord,
        crate::api::checkout::CheckoutRequest,
        crate::api::checkout::CheckoutResponse,
    )),
    tags(
        (name = "catalog", description = "Workflow template catalog"),
        (name = "checkout", description = "Hosted checkout initiation"),
        (name = "purchases", description = "Entitlement queries"),
        (name = "downloads", description = "Gated artifact downloads")
    )
)]
pub struct ApiDoc;
