use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegate_application::DEFAULT_SESSION_NAME;
use rolegate_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Backing store for role records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleStoreConfig {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub role_store: RoleStoreConfig,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub session_name: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let role_store = match env::var("ROLE_STORE")
            .unwrap_or_else(|_| "postgres".to_owned())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => RoleStoreConfig::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            "memory" if !migrate_only => RoleStoreConfig::Memory,
            "memory" => {
                return Err(AppError::Validation(
                    "the migrate command requires ROLE_STORE=postgres".to_owned(),
                ));
            }
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_STORE must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        Url::parse(frontend_url.as_str())
            .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let session_name = env::var("ASSUME_SESSION_NAME")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_owned());

        Ok(Self {
            migrate_only,
            role_store,
            frontend_url,
            api_host,
            api_port,
            session_name,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
