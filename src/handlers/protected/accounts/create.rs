use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use sqlx::PgPool;

use crate::database::models::{Account, AccountPayload};
use crate::database::repository::AccountRepository;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/accounts/create - Create an account in the caller's organisation
pub async fn post(
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<AccountPayload>, JsonRejection>,
) -> ApiResult<Account> {
    let org_id = auth_user.require_org()?;
    let Json(payload) = payload?;
    let payload = payload.prepare(true)?;

    let account = AccountRepository::new(&pool).create(org_id, auth_user.user_id, payload).await?;
    Ok(ApiResponse::created(account).with_message("Account created successfully"))
}
