use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::assume::{AssumePermission, AssumeSession, AssumeTracking, IssuanceCheck};

/// Session lifetime bound used when the provider does not report one.
pub const DEFAULT_MAX_SESSION_DURATION: u32 = 3_600;

/// Wildcard principal that trusts every caller.
const ANY_PRINCIPAL: &str = "*";

/// Role attributes sourced from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRole {
    /// Display identifier.
    pub role_name: String,
    /// Globally unique role identifier.
    pub role_arn: String,
    /// Creation timestamp.
    pub create_date: DateTime<Utc>,
    /// Upper bound in seconds on issued session lifetime.
    pub max_session_duration: u32,
    /// Principals listed in the trust policy, in document order.
    pub principal: Vec<String>,
}

impl ProviderRole {
    /// Validates provider attributes and normalizes identifiers.
    pub fn validated(self) -> AppResult<Self> {
        let role_arn = NonEmptyString::new(self.role_arn)
            .map_err(|_| AppError::Validation("role_arn must not be empty".to_owned()))?;
        let role_name = NonEmptyString::new(self.role_name).map_err(|_| {
            AppError::Validation(format!("role_name must not be empty for '{}'", role_arn.as_str()))
        })?;

        if self.max_session_duration == 0 {
            return Err(AppError::Validation(format!(
                "max_session_duration must be greater than zero for '{}'",
                role_arn.as_str()
            )));
        }

        Ok(Self {
            role_name: role_name.into(),
            role_arn: role_arn.into(),
            create_date: self.create_date,
            max_session_duration: self.max_session_duration,
            principal: self.principal,
        })
    }
}

/// Persisted assume-role state for one delegable role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    #[serde(flatten)]
    role: ProviderRole,
    #[serde(flatten)]
    tracking: AssumeTracking,
}

impl RoleRecord {
    /// Creates a record with empty tracking state.
    pub fn new(role: ProviderRole) -> AppResult<Self> {
        Self::from_parts(role, AssumeTracking::default())
    }

    /// Rebuilds a record from provider attributes and stored tracking state.
    pub fn from_parts(role: ProviderRole, tracking: AssumeTracking) -> AppResult<Self> {
        Ok(Self {
            role: role.validated()?,
            tracking,
        })
    }

    /// Returns the display identifier.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role.role_name.as_str()
    }

    /// Returns the unique role identifier.
    #[must_use]
    pub fn role_arn(&self) -> &str {
        self.role.role_arn.as_str()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn create_date(&self) -> DateTime<Utc> {
        self.role.create_date
    }

    /// Returns the session lifetime bound in seconds.
    #[must_use]
    pub fn max_session_duration(&self) -> u32 {
        self.role.max_session_duration
    }

    /// Returns trust-policy principals.
    #[must_use]
    pub fn principal(&self) -> &[String] {
        self.role.principal.as_slice()
    }

    /// Returns provider-sourced attributes.
    #[must_use]
    pub fn provider_role(&self) -> &ProviderRole {
        &self.role
    }

    /// Returns assume bookkeeping.
    #[must_use]
    pub fn tracking(&self) -> &AssumeTracking {
        &self.tracking
    }

    /// Returns whether the trust policy admits the principal.
    #[must_use]
    pub fn trusts(&self, principal: &str) -> bool {
        self.role
            .principal
            .iter()
            .any(|candidate| candidate == principal || candidate == ANY_PRINCIPAL)
    }

    /// Decides whether a new session may be issued to the principal.
    #[must_use]
    pub fn check_issuance(&self, principal: &str, now: DateTime<Utc>) -> IssuanceCheck {
        self.tracking.check_issuance(principal, now)
    }

    /// Records a new session and consumes the principal's permit.
    pub fn record_issuance(
        &mut self,
        principal: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        self.tracking
            .record_issuance(principal, issued_at, duration_seconds)
    }

    /// Checks issuance and records the session in one step.
    pub fn reserve_issuance(
        &mut self,
        principal: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        self.tracking
            .reserve_issuance(principal, issued_at, duration_seconds)
    }

    /// Withdraws a reserved session; returns whether it was still on record.
    pub fn release_issuance(&mut self, session: &AssumeSession) -> bool {
        self.tracking.release_issuance(session)
    }

    /// Stores an administrator permission flag.
    pub fn set_permission(&mut self, principal: &str, value: AssumePermission) {
        self.tracking.set_permission(principal, value);
    }

    /// Replaces provider-sourced attributes, keeping tracking state intact.
    pub fn refresh(&mut self, role: ProviderRole) -> AppResult<()> {
        let role = role.validated()?;
        if role.role_arn != self.role.role_arn {
            return Err(AppError::Conflict(format!(
                "cannot refresh role '{}' from provider role '{}'",
                self.role.role_arn, role.role_arn
            )));
        }

        let create_date = self.role.create_date;
        self.role = ProviderRole {
            create_date,
            ..role
        };
        Ok(())
    }

    /// Picks the session duration: requested value clamped to the role bound, else the bound.
    pub fn resolve_duration(&self, requested_seconds: Option<u32>) -> AppResult<u32> {
        match requested_seconds {
            Some(0) => Err(AppError::Validation(
                "duration_seconds must be greater than zero".to_owned(),
            )),
            Some(requested) => Ok(requested.min(self.role.max_session_duration)),
            None => Ok(self.role.max_session_duration),
        }
    }
}
