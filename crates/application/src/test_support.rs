use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use rolegate_core::{AppError, AppResult, ClientContext};
use rolegate_domain::{AssumePermission, AssumeSession, ProviderRole, RoleRecord};

use crate::{AssumeRoleRequest, Clock, IdentityProvider, IssuedCredentials, RoleRecordRepository};

pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

pub(crate) fn provider_role(role_arn: &str, principal: &[&str]) -> ProviderRole {
    ProviderRole {
        role_name: role_arn.to_lowercase(),
        role_arn: role_arn.to_owned(),
        create_date: epoch(),
        max_session_duration: 3_600,
        principal: principal.iter().map(|value| (*value).to_owned()).collect(),
    }
}

pub(crate) fn client(access_key: &str) -> ClientContext {
    match ClientContext::new(access_key, "secret", "http://rgw.test:8000", None) {
        Ok(client) => client,
        Err(error) => panic!("test client context should be valid: {error}"),
    }
}

/// Clock that only moves when told to.
#[derive(Default)]
pub(crate) struct FakeClock {
    offset_seconds: AtomicI64,
}

impl FakeClock {
    pub(crate) fn advance(&self, seconds: i64) {
        self.offset_seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        epoch() + Duration::seconds(self.offset_seconds.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub(crate) struct FakeRoleRecordRepository {
    roles: Mutex<HashMap<String, RoleRecord>>,
}

impl FakeRoleRecordRepository {
    pub(crate) async fn seed(&self, role: ProviderRole, permissions: &[(&str, AssumePermission)]) {
        let mut record = match RoleRecord::new(role) {
            Ok(record) => record,
            Err(error) => panic!("seeded role should be valid: {error}"),
        };
        for (principal, value) in permissions {
            record.set_permission(principal, *value);
        }
        self.roles
            .lock()
            .await
            .insert(record.role_arn().to_owned(), record);
    }

    pub(crate) async fn snapshot(&self, role_arn: &str) -> Option<RoleRecord> {
        self.roles.lock().await.get(role_arn).cloned()
    }
}

fn missing(role_arn: &str) -> AppError {
    AppError::NotFound(format!("role '{role_arn}' was not found"))
}

#[async_trait]
impl RoleRecordRepository for FakeRoleRecordRepository {
    async fn find_role(&self, role_arn: &str) -> AppResult<Option<RoleRecord>> {
        Ok(self.roles.lock().await.get(role_arn).cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let mut roles: Vec<RoleRecord> = self.roles.lock().await.values().cloned().collect();
        roles.sort_by(|left, right| left.role_name().cmp(right.role_name()));
        Ok(roles)
    }

    async fn upsert_provider_role(&self, role: ProviderRole) -> AppResult<RoleRecord> {
        let role = role.validated()?;
        let mut roles = self.roles.lock().await;
        let record = match roles.get_mut(role.role_arn.as_str()) {
            Some(existing) => {
                existing.refresh(role)?;
                existing.clone()
            }
            None => {
                let record = RoleRecord::new(role)?;
                roles.insert(record.role_arn().to_owned(), record.clone());
                record
            }
        };
        Ok(record)
    }

    async fn reserve_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        let mut roles = self.roles.lock().await;
        let record = roles.get_mut(role_arn).ok_or_else(|| missing(role_arn))?;
        record.reserve_issuance(principal_arn, issued_at, duration_seconds)
    }

    async fn release_issuance(&self, role_arn: &str, session: &AssumeSession) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let record = roles.get_mut(role_arn).ok_or_else(|| missing(role_arn))?;
        record.release_issuance(session);
        Ok(())
    }

    async fn set_permission(
        &self,
        role_arn: &str,
        principal_arn: &str,
        value: AssumePermission,
    ) -> AppResult<RoleRecord> {
        let mut roles = self.roles.lock().await;
        let record = roles.get_mut(role_arn).ok_or_else(|| missing(role_arn))?;
        record.set_permission(principal_arn, value);
        Ok(record.clone())
    }
}

/// Identity provider keyed by access key, counting issued sessions.
pub(crate) struct FakeIdentityProvider {
    principals: HashMap<String, String>,
    roles: Vec<ProviderRole>,
    fail_assume: bool,
    issued: AtomicUsize,
}

impl FakeIdentityProvider {
    pub(crate) fn new(principals: &[(&str, &str)], roles: Vec<ProviderRole>) -> Self {
        Self {
            principals: principals
                .iter()
                .map(|(key, principal)| ((*key).to_owned(), (*principal).to_owned()))
                .collect(),
            roles,
            fail_assume: false,
            issued: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_assume(mut self) -> Self {
        self.fail_assume = true;
        self
    }

    pub(crate) fn issued_count(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn resolve_principal(&self, client: &ClientContext) -> AppResult<String> {
        self.principals
            .get(client.access_key())
            .cloned()
            .ok_or_else(|| AppError::IdentityProvider("InvalidAccessKeyId".to_owned()))
    }

    async fn assume_role(
        &self,
        _client: &ClientContext,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials> {
        // Let concurrent callers interleave around the provider round-trip.
        tokio::task::yield_now().await;

        if self.fail_assume {
            return Err(AppError::IdentityProvider(format!(
                "AccessDenied: cannot assume '{}'",
                request.role_arn
            )));
        }

        let serial = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(IssuedCredentials {
            access_key_id: format!("ASIA{serial}"),
            secret_access_key: "temporary-secret".to_owned(),
            session_token: format!("token-{}", request.session_name),
            expires_at: epoch() + Duration::seconds(i64::from(request.duration_seconds)),
        })
    }

    async fn list_roles(&self, _client: &ClientContext) -> AppResult<Vec<ProviderRole>> {
        Ok(self.roles.clone())
    }
}
