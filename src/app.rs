use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CONFIG;
use crate::handlers::{protected, public};
use crate::is_production;
use crate::middleware::jwt_auth_middleware;

/// Full router: public routes, JWT-protected `/api` routes and global layers
pub fn app(pool: PgPool) -> Router {
    Router::new()
        // Public
        .merge(public_routes())
        // Protected API
        .merge(protected_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(CONFIG.api.max_request_size_bytes))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(pool))
}

fn public_routes() -> Router {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(account_routes())
        .merge(customer_routes())
        .merge(invoice_routes())
        .merge(account_contact_routes())
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn account_routes() -> Router {
    use protected::accounts;

    Router::new()
        .route("/api/accounts/list", get(accounts::list_get))
        .route("/api/accounts/search-acc", get(accounts::search_get))
        .route("/api/accounts/create", post(accounts::create_post))
        .route(
            "/api/accounts/:id",
            get(accounts::record_get).put(accounts::record_put).delete(accounts::record_delete),
        )
        .route("/api/accounts/:id/contacts", get(accounts::contacts_get))
}

fn customer_routes() -> Router {
    Router::new().route("/api/customers/list", get(protected::customers::list_get))
}

fn invoice_routes() -> Router {
    use protected::invoices;

    Router::new()
        .route("/api/invoices", post(invoices::create_post))
        .route("/api/invoices/list", get(invoices::list_get))
}

fn account_contact_routes() -> Router {
    Router::new().route("/api/account-contacts", post(protected::account_contacts::create_post))
}

fn cors() -> CorsLayer {
    if !is_production!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = CONFIG
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
