use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::{Claims, UserType};
use crate::config;
use crate::error::ApiError;

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Option<i64>,
    pub org_id: Option<i64>,
    pub user_type: UserType,
    pub role_id: Option<i64>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id.filter(|id| *id > 0),
            org_id: claims.org_id.filter(|id| *id > 0),
            user_type: UserType::parse(&claims.user_type),
            role_id: claims.role_id,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.user_type.is_admin()
    }

    /// The caller's organisation, or 403 when the token carries none
    pub fn require_org(&self) -> Result<i64, ApiError> {
        self.org_id.ok_or_else(|| ApiError::forbidden("Access denied"))
    }

    pub fn require_user(&self) -> Result<i64, ApiError> {
        self.user_id.ok_or_else(|| ApiError::forbidden("Access denied"))
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, impl IntoResponse> {
    let reject = |api_error: ApiError| {
        let status = StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
        (status, Json(api_error.to_json()))
    };

    let token = extract_jwt_from_headers(&headers).map_err(|msg| reject(ApiError::unauthorized(msg)))?;
    let claims = validate_jwt(&token).map_err(|msg| reject(ApiError::unauthorized(msg)))?;

    let auth_user = AuthUser::from(claims);

    // Everyone but app admins works inside an organisation
    if auth_user.org_id.is_none() && auth_user.user_type != UserType::AppAdmin {
        tracing::warn!("Token for user {:?} carries no organisation", auth_user.user_id);
        return Err(reject(ApiError::forbidden("Access denied")));
    }

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims. RS256 when a public key is
/// configured, HS256 with the shared secret otherwise.
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let security = &config::config().security;

    let (decoding_key, validation) = match &security.jwt_public_key_pem {
        Some(pem) => {
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                .map_err(|e| format!("JWT public key is invalid: {}", e))?;
            (key, Validation::new(Algorithm::RS256))
        }
        None => {
            if security.jwt_secret.is_empty() {
                return Err("JWT secret not configured".to_string());
            }
            (DecodingKey::from_secret(security.jwt_secret.as_bytes()), Validation::new(Algorithm::HS256))
        }
    };

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn non_positive_ids_are_treated_as_missing() {
        let claims = Claims { user_id: Some(0), org_id: Some(-1), user_type: "sales".into(), role_id: None, exp: 0, iat: 0 };
        let user = AuthUser::from(claims);
        assert!(user.user_id.is_none());
        assert!(user.org_id.is_none());
        assert_eq!(user.require_org().unwrap_err().status_code(), 403);
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Token abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc");
    }
}
