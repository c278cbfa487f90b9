// handlers/public/mod.rs - Public handlers (no authentication required)
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::database::DatabaseManager;

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "CRM API (Rust)",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant CRM API: accounts, customers, invoices and contacts",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "accounts": "/api/accounts/list, /api/accounts/search-acc, /api/accounts/create, /api/accounts/:id[/contacts] (protected)",
                "customers": "/api/customers/list (protected)",
                "invoices": "/api/invoices, /api/invoices/list (protected)",
                "account_contacts": "/api/account-contacts (protected)",
            }
        }
    }))
}

/// GET /health - Pings the pool
pub async fn health(Extension(pool): Extension<PgPool>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "status": 503,
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
