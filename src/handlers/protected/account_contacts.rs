use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use sqlx::PgPool;

use crate::database::models::{AccountContact, NewAccountContact};
use crate::database::repository::AccountContactRepository;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/account-contacts - Add a contact to an account of the caller's organisation
pub async fn create_post(
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Result<Json<NewAccountContact>, JsonRejection>,
) -> ApiResult<AccountContact> {
    let org_id = auth_user.require_org()?;
    let Json(contact) = payload?;
    let contact = contact.prepare()?;

    let created = AccountContactRepository::new(&pool).create(org_id, contact).await?;
    Ok(ApiResponse::created(created).with_message("Contact created successfully"))
}
