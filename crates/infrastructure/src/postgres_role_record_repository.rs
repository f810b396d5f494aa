use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use rolegate_application::RoleRecordRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{
    AssumePermission, AssumeSession, AssumeTracking, ProviderRole, RoleRecord,
};

mod tracking;


/// PostgreSQL-backed repository for assumable role records.
///
/// Tracking mutations lock the role row for the length of one transaction.
/// Issuance reservations check and record under that lock, so API replicas
/// sharing one database cannot both reserve a session for the same principal.
#[derive(Clone)]
pub struct PostgresRoleRecordRepository {
    pool: PgPool,
}

impl PostgresRoleRecordRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRecordRow {
    role_arn: String,
    role_name: String,
    create_date: DateTime<Utc>,
    max_session_duration: i32,
    principal: Json<Vec<String>>,
    assumed_users: Json<BTreeSet<String>>,
    assume_history: Json<Vec<AssumeSession>>,
    assume_permission: Json<BTreeMap<String, AssumePermission>>,
}

impl TryFrom<RoleRecordRow> for RoleRecord {
    type Error = AppError;

    fn try_from(row: RoleRecordRow) -> Result<Self, Self::Error> {
        let max_session_duration = u32::try_from(row.max_session_duration).map_err(|_| {
            AppError::Internal(format!(
                "stored max_session_duration for role '{}' is out of range",
                row.role_arn
            ))
        })?;

        let role = ProviderRole {
            role_name: row.role_name,
            role_arn: row.role_arn,
            create_date: row.create_date,
            max_session_duration,
            principal: row.principal.0,
        };
        let tracking = AssumeTracking::from_parts(
            row.assumed_users.0,
            row.assume_history.0,
            row.assume_permission.0,
        );

        RoleRecord::from_parts(role, tracking)
    }
}

fn duration_column(role: &ProviderRole) -> AppResult<i32> {
    i32::try_from(role.max_session_duration).map_err(|_| {
        AppError::Validation(format!(
            "max_session_duration for '{}' exceeds supported range",
            role.role_arn
        ))
    })
}

#[async_trait]
impl RoleRecordRepository for PostgresRoleRecordRepository {
    async fn find_role(&self, role_arn: &str) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRecordRow>(
            r#"
            SELECT
                role_arn,
                role_name,
                create_date,
                max_session_duration,
                principal,
                assumed_users,
                assume_history,
                assume_permission
            FROM assumable_roles
            WHERE role_arn = $1
            "#,
        )
        .bind(role_arn)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        row.map(RoleRecord::try_from).transpose()
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let rows = sqlx::query_as::<_, RoleRecordRow>(
            r#"
            SELECT
                role_arn,
                role_name,
                create_date,
                max_session_duration,
                principal,
                assumed_users,
                assume_history,
                assume_permission
            FROM assumable_roles
            ORDER BY role_name, role_arn
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        rows.into_iter().map(RoleRecord::try_from).collect()
    }

    async fn upsert_provider_role(&self, role: ProviderRole) -> AppResult<RoleRecord> {
        let role = role.validated()?;

        let row = sqlx::query_as::<_, RoleRecordRow>(
            r#"
            INSERT INTO assumable_roles (
                role_arn,
                role_name,
                create_date,
                max_session_duration,
                principal
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (role_arn) DO UPDATE
            SET role_name = EXCLUDED.role_name,
                max_session_duration = EXCLUDED.max_session_duration,
                principal = EXCLUDED.principal,
                updated_at = now()
            RETURNING
                role_arn,
                role_name,
                create_date,
                max_session_duration,
                principal,
                assumed_users,
                assume_history,
                assume_permission
            "#,
        )
        .bind(role.role_arn.as_str())
        .bind(role.role_name.as_str())
        .bind(role.create_date)
        .bind(duration_column(&role)?)
        .bind(Json(&role.principal))
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert role: {error}")))?;

        RoleRecord::try_from(row)
    }

    async fn reserve_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        let mut transaction = self.begin().await?;
        let mut record = tracking::lock_role(&mut transaction, role_arn).await?;

        let session = record.reserve_issuance(principal_arn, issued_at, duration_seconds)?;
        tracking::store_tracking(&mut transaction, &record).await?;
        commit(transaction).await?;

        Ok(session)
    }

    async fn release_issuance(&self, role_arn: &str, session: &AssumeSession) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let mut record = tracking::lock_role(&mut transaction, role_arn).await?;

        if record.release_issuance(session) {
            tracking::store_tracking(&mut transaction, &record).await?;
        }
        commit(transaction).await
    }

    async fn set_permission(
        &self,
        role_arn: &str,
        principal_arn: &str,
        value: AssumePermission,
    ) -> AppResult<RoleRecord> {
        let mut transaction = self.begin().await?;
        let mut record = tracking::lock_role(&mut transaction, role_arn).await?;

        record.set_permission(principal_arn, value);
        tracking::store_tracking(&mut transaction, &record).await?;
        commit(transaction).await?;

        Ok(record)
    }
}

impl PostgresRoleRecordRepository {
    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'_, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}
