use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rolegate_core::AppResult;
use rolegate_domain::{AssumePermission, AssumeSession, ProviderRole, RoleRecord};

/// Repository port for persisted role records.
///
/// Mutations are single atomic read-modify-write operations against one record
/// and fail with `AppError::NotFound` when the role is unknown.
#[async_trait]
pub trait RoleRecordRepository: Send + Sync {
    /// Finds one role record by ARN.
    async fn find_role(&self, role_arn: &str) -> AppResult<Option<RoleRecord>>;

    /// Lists all role records ordered by role name.
    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>>;

    /// Inserts a role or refreshes its provider attributes, keeping tracking state.
    async fn upsert_provider_role(&self, role: ProviderRole) -> AppResult<RoleRecord>;

    /// Runs the issuance check and, when it passes, records the session atomically.
    ///
    /// Fails with `AppError::Forbidden` and writes nothing when the check denies.
    async fn reserve_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession>;

    /// Removes a reserved session and restores the permit it consumed.
    async fn release_issuance(&self, role_arn: &str, session: &AssumeSession) -> AppResult<()>;

    /// Stores an administrator permission flag and returns the updated record.
    async fn set_permission(
        &self,
        role_arn: &str,
        principal_arn: &str,
        value: AssumePermission,
    ) -> AppResult<RoleRecord>;
}
