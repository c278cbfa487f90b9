use axum::extract::{Extension, Query};
use sqlx::PgPool;

use crate::database::models::{AccountListing, AccountView};
use crate::database::repository::AccountRepository;
use crate::database::schema::ACCOUNTS;
use crate::middleware::{AuthUser, ListResponse, ListResult};
use crate::policy::VisibilityPolicy;

use super::super::utils::{listing, ListQuery};

/// GET /api/accounts/list - Filtered, sorted, paginated accounts visible to the caller
pub async fn get(
    Query(query): Query<ListQuery>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ListResult<AccountView> {
    let org_id = auth_user.require_org()?;

    let assembler = listing::<AccountListing>(&ACCOUNTS, org_id, &query)?
        .restrict(VisibilityPolicy::accounts().restrict(&auth_user));

    let result = AccountRepository::new(&pool).list(assembler).await?;
    Ok(ListResponse::new(result.rows, result.total, result.page))
}
