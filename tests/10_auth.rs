mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::get(&app, "/api/accounts/list", None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 401);
    assert_eq!(body["message"], "Missing Authorization header");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() -> Result<()> {
    let app = common::offline_app();
    let claims = crm_api_rust::auth::Claims::new(Some(1), Some(1), "admin", None);
    let forged = crm_api_rust::auth::generate_jwt_with_secret(&claims, "not-the-server-secret").expect("token");

    let (status, body) = common::get(&app, "/api/accounts/list", Some(&forged)).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].as_str().unwrap_or_default().starts_with("Invalid JWT token"));
    Ok(())
}

#[tokio::test]
async fn member_without_organisation_is_forbidden() -> Result<()> {
    let app = common::offline_app();
    let token = common::token(Some(4), None, "sales");

    let (status, body) = common::get(&app, "/api/accounts/list", Some(&token)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");
    Ok(())
}

#[tokio::test]
async fn app_admin_without_organisation_cannot_list() -> Result<()> {
    let app = common::offline_app();
    let token = common::token(Some(1), None, "app_admin");

    let (status, _) = common::get(&app, "/api/accounts/list", Some(&token)).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn only_admins_delete_accounts() -> Result<()> {
    let app = common::offline_app();
    let token = common::token(Some(4), Some(9), "sales");

    let (status, body) = common::request(&app, "DELETE", "/api/accounts/17", Some(&token), None).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only administrators can delete accounts");
    Ok(())
}

#[tokio::test]
async fn banner_is_public() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::get(&app, "/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "CRM API (Rust)");
    Ok(())
}
