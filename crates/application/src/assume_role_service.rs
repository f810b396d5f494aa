use std::sync::Arc;

use rolegate_core::AppResult;
use rolegate_domain::{
    AssumePermission, AssumeSession, IssuanceCheck, RoleRecord, SessionLiveness,
};

use crate::assume_role_ports::{IdentityProvider, IssuedCredentials, RoleRecordRepository};
use crate::AuthorizationTracker;

mod issuance;
mod listing;
mod locks;
mod sync;

#[cfg(test)]
mod tests;

use locks::IssuanceLocks;

/// Session name used when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "temp-session";

/// Credentials and bookkeeping for one successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Assumed role.
    pub role_arn: String,
    /// Principal that received the session.
    pub principal_arn: String,
    /// Temporary credentials from the provider.
    pub credentials: IssuedCredentials,
    /// History entry recorded for the issuance.
    pub session: AssumeSession,
}

/// Role assumable by a principal together with its current issuance state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRoleView {
    /// Stored role record.
    pub record: RoleRecord,
    /// Issuance check for the principal at listing time.
    pub check: IssuanceCheck,
}

/// Permission flag and liveness of one principal on one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalPermission {
    /// Principal identifier.
    pub principal_arn: String,
    /// Stored permission flag.
    pub permission: AssumePermission,
    /// Liveness of the principal's latest session.
    pub liveness: SessionLiveness,
}

/// Administrative view of the permission flags stored on one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionOverview {
    /// Role identifier.
    pub role_arn: String,
    /// Role display name.
    pub role_name: String,
    /// Principals with a stored flag, ordered by identifier.
    pub principals: Vec<PrincipalPermission>,
}

/// Outcome of a role synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSyncSummary {
    /// Number of provider roles written to the store.
    pub synchronized: usize,
    /// Number of provider roles rejected by validation.
    pub skipped: usize,
}

/// Application service for assume-role issuance and administration.
#[derive(Clone)]
pub struct AssumeRoleService {
    tracker: AuthorizationTracker,
    repository: Arc<dyn RoleRecordRepository>,
    identity_provider: Arc<dyn IdentityProvider>,
    issuance_locks: IssuanceLocks,
    session_name: String,
}

impl AssumeRoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        tracker: AuthorizationTracker,
        repository: Arc<dyn RoleRecordRepository>,
        identity_provider: Arc<dyn IdentityProvider>,
        session_name: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            repository,
            identity_provider,
            issuance_locks: IssuanceLocks::default(),
            session_name: session_name.into(),
        }
    }

    /// Returns the issuance check for a role and principal.
    pub async fn check_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
    ) -> AppResult<IssuanceCheck> {
        self.tracker.check_issuance(role_arn, principal_arn).await
    }

    /// Applies an administrator permission flag.
    pub async fn update_permission(
        &self,
        role_arn: &str,
        principal_arn: &str,
        value: AssumePermission,
    ) -> AppResult<RoleRecord> {
        self.tracker
            .reset_permission(role_arn, principal_arn, value)
            .await
    }
}
