use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolegate_application::RoleRecordRepository;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{AssumePermission, AssumeSession, ProviderRole, RoleRecord};
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

/// In-memory role record repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryRoleRecordRepository {
    roles: RwLock<HashMap<String, RoleRecord>>,
}

impl InMemoryRoleRecordRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
        }
    }
}

fn role_not_found(role_arn: &str) -> AppError {
    AppError::NotFound(format!("role '{role_arn}' was not found"))
}

#[async_trait]
impl RoleRecordRepository for InMemoryRoleRecordRepository {
    async fn find_role(&self, role_arn: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.roles.read().await.get(role_arn).cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let roles = self.roles.read().await;

        let mut values: Vec<RoleRecord> = roles.values().cloned().collect();
        values.sort_by(|left, right| {
            left.role_name()
                .cmp(right.role_name())
                .then_with(|| left.role_arn().cmp(right.role_arn()))
        });

        Ok(values)
    }

    async fn upsert_provider_role(&self, role: ProviderRole) -> AppResult<RoleRecord> {
        let role = role.validated()?;
        let mut roles = self.roles.write().await;

        if let Some(existing) = roles.get_mut(role.role_arn.as_str()) {
            existing.refresh(role)?;
            return Ok(existing.clone());
        }

        let record = RoleRecord::new(role)?;
        roles.insert(record.role_arn().to_owned(), record.clone());
        Ok(record)
    }

    async fn reserve_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        let mut roles = self.roles.write().await;
        let record = roles
            .get_mut(role_arn)
            .ok_or_else(|| role_not_found(role_arn))?;

        record.reserve_issuance(principal_arn, issued_at, duration_seconds)
    }

    async fn release_issuance(&self, role_arn: &str, session: &AssumeSession) -> AppResult<()> {
        let mut roles = self.roles.write().await;
        let record = roles
            .get_mut(role_arn)
            .ok_or_else(|| role_not_found(role_arn))?;

        record.release_issuance(session);
        Ok(())
    }

    async fn set_permission(
        &self,
        role_arn: &str,
        principal_arn: &str,
        value: AssumePermission,
    ) -> AppResult<RoleRecord> {
        let mut roles = self.roles.write().await;
        let record = roles
            .get_mut(role_arn)
            .ok_or_else(|| role_not_found(role_arn))?;

        record.set_permission(principal_arn, value);
        Ok(record.clone())
    }
}
