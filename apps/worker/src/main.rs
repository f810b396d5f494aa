//! Rolegate role synchronization worker.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use rolegate_application::{
    AssumeRoleService, AuthorizationTracker, DEFAULT_SESSION_NAME, SystemClock,
};
use rolegate_core::{AppError, AppResult, ClientContext};
use rolegate_infrastructure::{AwsIdentityProvider, PostgresRoleRecordRepository};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct WorkerConfig {
    database_url: String,
    client: ClientContext,
    sync_interval_seconds: u64,
    run_once: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let service = build_assume_role_service(pool);

    info!(
        endpoint = %config.client.endpoint(),
        region = %config.client.region(),
        sync_interval_seconds = config.sync_interval_seconds,
        run_once = config.run_once,
        "rolegate-worker started"
    );

    loop {
        match service.sync_roles(&config.client).await {
            Ok(summary) => {
                info!(
                    synchronized = summary.synchronized,
                    skipped = summary.skipped,
                    "role sync completed"
                );
            }
            Err(error) => {
                warn!(error = %error, "role sync failed");
                if config.run_once {
                    return Err(error);
                }
            }
        }

        if config.run_once {
            return Ok(());
        }

        tokio::time::sleep(Duration::from_secs(config.sync_interval_seconds)).await;
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_assume_role_service(pool: PgPool) -> AssumeRoleService {
    let repository = Arc::new(PostgresRoleRecordRepository::new(pool));
    let tracker = AuthorizationTracker::new(repository.clone(), Arc::new(SystemClock));

    AssumeRoleService::new(
        tracker,
        repository,
        Arc::new(AwsIdentityProvider::new()),
        DEFAULT_SESSION_NAME,
    )
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let endpoint = required_env("SYNC_ENDPOINT")?;
        let region = env::var("SYNC_REGION").ok();
        let client = ClientContext::new(
            required_env("SYNC_ACCESS_KEY")?,
            required_env("SYNC_SECRET_KEY")?,
            endpoint.as_str(),
            region.as_deref(),
        )?;
        let sync_interval_seconds = parse_env_u64("SYNC_INTERVAL_SECONDS", 300)?;
        let run_once = env::args().nth(1).as_deref() == Some("once");

        if sync_interval_seconds == 0 {
            return Err(AppError::Validation(
                "SYNC_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            client,
            sync_interval_seconds,
            run_once,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
