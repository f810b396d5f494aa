//! Assume-role authorization tracking.
//!
//! Decides whether a principal may receive a new session for a role, records
//! issued sessions, and applies administrator permission resets. Time comes from
//! one injected [`Clock`] so issuance and expiry comparison always agree.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use rolegate_core::{AppError, AppResult, NonEmptyString};
use rolegate_domain::{AssumePermission, AssumeSession, IssuanceCheck, RoleRecord};

use crate::assume_role_ports::{Clock, RoleRecordRepository};


/// Application service for per-role, per-principal issuance bookkeeping.
#[derive(Clone)]
pub struct AuthorizationTracker {
    repository: Arc<dyn RoleRecordRepository>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationTracker {
    /// Creates a tracker from a repository and clock.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRecordRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Returns the tracker's current time.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns session liveness and whether a new issuance is permitted. Read-only.
    pub async fn check_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
    ) -> AppResult<IssuanceCheck> {
        let principal_arn = require_principal(principal_arn)?;
        let role = self.require_role(role_arn).await?;

        Ok(role.check_issuance(principal_arn.as_str(), self.now()))
    }

    /// Checks and records an issuance as one atomic store operation.
    ///
    /// Concurrent reservations for the same role and principal, from this
    /// process or another one sharing the store, cannot both succeed.
    pub async fn reserve_issuance(
        &self,
        role_arn: &str,
        principal_arn: &str,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        let principal_arn = require_principal(principal_arn)?;

        self.repository
            .reserve_issuance(
                role_arn,
                principal_arn.as_str(),
                self.now(),
                duration_seconds,
            )
            .await
    }

    /// Undoes a reservation whose session was never issued.
    pub async fn release_issuance(&self, role_arn: &str, session: &AssumeSession) -> AppResult<()> {
        self.repository.release_issuance(role_arn, session).await
    }

    /// Stores an administrator permission flag for one principal on one role.
    ///
    /// `Permit` also purges the principal's sessions for this role, which is the
    /// only way to unblock a principal before its session expires.
    pub async fn reset_permission(
        &self,
        role_arn: &str,
        principal_arn: &str,
        value: AssumePermission,
    ) -> AppResult<RoleRecord> {
        let principal_arn = require_principal(principal_arn)?;

        self.repository
            .set_permission(role_arn, principal_arn.as_str(), value)
            .await
    }

    /// Loads a role record or fails with `NotFound`.
    pub async fn require_role(&self, role_arn: &str) -> AppResult<RoleRecord> {
        self.repository
            .find_role(role_arn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_arn}' was not found")))
    }
}

fn require_principal(principal_arn: &str) -> AppResult<NonEmptyString> {
    NonEmptyString::new(principal_arn)
        .map_err(|_| AppError::Validation("principal_arn must not be empty".to_owned()))
}
