use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config;

/// Token claims issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub org_id: Option<i64>,
    pub user_type: String,
    #[serde(default)]
    pub role_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Option<i64>, org_id: Option<i64>, user_type: impl Into<String>, role_id: Option<i64>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id,
            org_id,
            user_type: user_type.into(),
            role_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Caller category. Admins see every account of their organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserType {
    Admin,
    AppAdmin,
    Member(String),
}

impl UserType {
    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => UserType::Admin,
            "app_admin" => UserType::AppAdmin,
            other => UserType::Member(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UserType::Admin => "admin",
            UserType::AppAdmin => "app_admin",
            UserType::Member(s) => s,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserType::Admin | UserType::AppAdmin)
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Mint an HS256 token with the configured secret. Used by the CLI and tests;
/// production tokens come from the identity service.
pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    generate_jwt_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn generate_jwt_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_types_parse() {
        assert_eq!(UserType::parse("admin"), UserType::Admin);
        assert_eq!(UserType::parse("app_admin"), UserType::AppAdmin);
        assert_eq!(UserType::parse("sales"), UserType::Member("sales".into()));
        assert!(UserType::AppAdmin.is_admin());
        assert!(!UserType::parse("sales").is_admin());
    }

    #[test]
    fn empty_secret_is_rejected() {
        let claims = Claims::new(Some(1), Some(1), "admin", None);
        assert!(matches!(generate_jwt_with_secret(&claims, ""), Err(JwtError::InvalidSecret)));
        assert!(generate_jwt_with_secret(&claims, "s3cret").is_ok());
    }
}
