use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use sqlx::PgPool;

use crate::database::models::{InvoiceListing, InvoiceWithItems, NewInvoice};
use crate::database::repository::InvoiceRepository;
use crate::database::schema::INVOICES;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ListResponse, ListResult};

use super::utils::{listing, ListQuery};

/// POST /api/invoices - Invoice and items in one transaction
pub async fn create_post(
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<NewInvoice>, JsonRejection>,
) -> ApiResult<InvoiceWithItems> {
    let org_id = auth_user.require_org()?;
    let Json(invoice) = payload?;
    let invoice = invoice.prepare()?;

    let created = InvoiceRepository::new(&pool).create(org_id, invoice).await?;
    Ok(ApiResponse::created(created).with_message("Invoice created successfully"))
}

/// GET /api/invoices/list - Invoices of the caller's organisation
pub async fn list_get(
    Query(query): Query<ListQuery>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ListResult<InvoiceListing> {
    let org_id = auth_user.require_org()?;
    let result = listing::<InvoiceListing>(&INVOICES, org_id, &query)?.fetch_page(&pool).await?;
    Ok(ListResponse::new(result.rows, result.total, result.page))
}
