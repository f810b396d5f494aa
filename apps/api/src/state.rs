use rolegate_application::AssumeRoleService;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub assume_role_service: AssumeRoleService,
    pub postgres_pool: Option<PgPool>,
}
