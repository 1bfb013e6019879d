//! Ecclesia API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use ecclesia_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, build_postgres_session_layer, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = build_app_state(pool.clone(), &config);

    if let Some(subject) = config.bootstrap_super_admin_subject.as_deref() {
        app_state
            .user_admin_service
            .promote_bootstrap_super_admin(subject)
            .await?;
    }

    let session_layer = build_postgres_session_layer(pool, config.cookie_secure).await?;
    let app = build_router(app_state, &config.frontend_url, session_layer)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "ecclesia-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
