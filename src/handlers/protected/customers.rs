use axum::extract::{Extension, Query};
use sqlx::PgPool;

use crate::database::models::CustomerListing;
use crate::database::schema::CUSTOMERS;
use crate::middleware::{AuthUser, ListResponse, ListResult};

use super::utils::{listing, ListQuery};

/// GET /api/customers/list - Live customers of the caller's organisation
pub async fn list_get(
    Query(query): Query<ListQuery>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ListResult<CustomerListing> {
    let org_id = auth_user.require_org()?;
    let result = listing::<CustomerListing>(&CUSTOMERS, org_id, &query)?.fetch_page(&pool).await?;
    Ok(ListResponse::new(result.rows, result.total, result.page))
}
