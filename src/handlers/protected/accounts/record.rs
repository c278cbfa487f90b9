use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::database::models::{Account, AccountPayload, AccountView};
use crate::database::repository::AccountRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/accounts/:id - One account of the caller's organisation
pub async fn get(
    Path(id): Path<i64>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<AccountView> {
    let org_id = auth_user.require_org()?;
    let account = AccountRepository::new(&pool).find(org_id, id).await?;
    Ok(ApiResponse::success(account))
}

/// PUT /api/accounts/:id - Partial update; members may only touch accounts they created
pub async fn put(
    Path(id): Path<i64>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<AccountPayload>, JsonRejection>,
) -> ApiResult<Account> {
    let org_id = auth_user.require_org()?;
    let Json(payload) = payload?;
    let payload = payload.prepare(false)?;

    let owner = if auth_user.is_admin() { None } else { Some(auth_user.require_user()?) };

    let account = AccountRepository::new(&pool).update(org_id, id, owner, payload).await?;
    Ok(ApiResponse::success(account).with_message("Account updated successfully"))
}

/// DELETE /api/accounts/:id - Admins only; refused while customers or invoices reference it
pub async fn delete(
    Path(id): Path<i64>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    if !auth_user.is_admin() {
        tracing::warn!("User {:?} attempted to delete account {} without admin rights", auth_user.user_id, id);
        return Err(ApiError::forbidden("Only administrators can delete accounts"));
    }
    let org_id = auth_user.require_org()?;

    AccountRepository::new(&pool).delete(org_id, id).await?;
    Ok(ApiResponse::success(json!({ "id": id })).with_message("Account deleted successfully"))
}
