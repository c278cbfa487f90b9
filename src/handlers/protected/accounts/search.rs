use axum::extract::{Extension, Query};
use serde::Deserialize;
use sqlx::PgPool;

use crate::database::models::AccountSearchHit;
use crate::database::repository::AccountRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::super::utils::non_blank;

const DEFAULT_SEARCH_LIMIT: i64 = 50;
const MAX_SEARCH_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub limit: Option<String>,
}

impl SearchQuery {
    fn limit(&self) -> Result<i64, ApiError> {
        let Some(raw) = non_blank(&self.limit) else {
            return Ok(DEFAULT_SEARCH_LIMIT);
        };
        match raw.parse::<i64>() {
            Ok(limit) if (1..=MAX_SEARCH_LIMIT).contains(&limit) => Ok(limit),
            _ => Err(ApiError::bad_request(format!("Limit must be between 1 and {}", MAX_SEARCH_LIMIT))),
        }
    }
}

/// GET /api/accounts/search-acc - Quick name/email/phone lookup
pub async fn get(
    Query(query): Query<SearchQuery>,
    Extension(pool): Extension<PgPool>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<AccountSearchHit>> {
    let org_id = auth_user.require_org()?;
    let name = non_blank(&query.name).ok_or_else(|| ApiError::bad_request("Search query is required"))?;
    let limit = query.limit()?;

    let hits = AccountRepository::new(&pool).search(org_id, name, limit).await?;
    Ok(ApiResponse::success(hits))
}
