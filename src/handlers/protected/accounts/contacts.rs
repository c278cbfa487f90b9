use axum::extract::{Extension, Path};
use serde::Serialize;
use sqlx::PgPool;

use crate::database::models::{Account, AccountContact};
use crate::database::repository::AccountRepository;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
pub struct AccountWithContacts {
    #[serde(flatten)]
    pub account: Account,
    pub full_address: String,
    pub contacts: Vec<AccountContact>,
}

/// GET /api/accounts/:id/contacts - The account and its contacts, primary first
pub async fn get(
    Path(id): Path<i64>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<AccountWithContacts> {
    let org_id = auth_user.require_org()?;
    let (account, contacts) = AccountRepository::new(&pool).contacts(org_id, id).await?;

    let full_address = account.full_address();
    Ok(ApiResponse::success(AccountWithContacts { account, full_address, contacts }))
}
