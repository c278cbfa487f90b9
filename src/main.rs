use crm_api_rust::{app, config, database::DatabaseManager};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting CRM API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() && config.security.jwt_public_key_pem.is_none() {
        tracing::warn!("Neither JWT_SECRET nor JWT_PUBLIC_KEY_PEM is set; every /api request will be rejected");
    }

    let pool = DatabaseManager::connect(&config.database).await?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("CRM API listening on http://{}", bind_addr);

    axum::serve(listener, app(pool)).await?;
    Ok(())
}
