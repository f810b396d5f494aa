use std::sync::Arc;

use rolegate_application::{
    AssumeRoleService, AuthorizationTracker, RoleRecordRepository, SystemClock,
};
use rolegate_infrastructure::{
    AwsIdentityProvider, InMemoryRoleRecordRepository, PostgresRoleRecordRepository,
};
use sqlx::PgPool;

use crate::state::AppState;

mod database;

pub use database::connect_and_migrate;

/// Wires the assume-role service onto the configured store.
///
/// Without a pool the process keeps role records in memory only.
pub fn build_app_state(postgres_pool: Option<PgPool>, session_name: &str) -> AppState {
    let repository: Arc<dyn RoleRecordRepository> = match postgres_pool.clone() {
        Some(pool) => Arc::new(PostgresRoleRecordRepository::new(pool)),
        None => Arc::new(InMemoryRoleRecordRepository::new()),
    };
    let tracker = AuthorizationTracker::new(repository.clone(), Arc::new(SystemClock));
    let assume_role_service = AssumeRoleService::new(
        tracker,
        repository,
        Arc::new(AwsIdentityProvider::new()),
        session_name,
    );

    AppState {
        assume_role_service,
        postgres_pool,
    }
}
