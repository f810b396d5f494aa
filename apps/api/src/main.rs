//! Rolegate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod state;

use rolegate_core::AppError;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, RoleStoreConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, connect_and_migrate};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let postgres_pool = match &config.role_store {
        RoleStoreConfig::Postgres { database_url } => {
            Some(connect_and_migrate(database_url.as_str()).await?)
        }
        RoleStoreConfig::Memory => {
            warn!("ROLE_STORE=memory; role records are lost on restart");
            None
        }
    };

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = build_app_state(postgres_pool, config.session_name.as_str());
    let app = build_router(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "rolegate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
