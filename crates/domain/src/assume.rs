use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Administrator-controlled gate on the next issuance for one principal.
///
/// Stored and transported values are parsed by [`FromStr`], so `yes`/`no` and
/// any letter case are accepted on both paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssumePermission {
    /// The principal may request one more session.
    Permit,
    /// The last permit was used, or none was ever granted.
    #[default]
    Consumed,
}

impl AssumePermission {
    /// Returns a stable storage value for this permission flag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permit => "permit",
            Self::Consumed => "consumed",
        }
    }

    /// Parses a transport value into a permission flag.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for AssumePermission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permit" | "yes" => Ok(Self::Permit),
            "consumed" | "no" => Ok(Self::Consumed),
            _ => Err(AppError::Validation(format!(
                "unknown assume permission value '{value}'"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for AssumePermission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(value.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Whether a principal still holds a live session on a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionLiveness {
    /// No session was ever recorded for the principal.
    NoHistory,
    /// The latest recorded session has expired.
    Expired,
    /// The latest recorded session is still valid.
    Active,
}

impl SessionLiveness {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoHistory => "no_history",
            Self::Expired => "expired",
            Self::Active => "active",
        }
    }
}

/// Reason a new session is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuanceDenial {
    /// A live session blocks reissuance.
    SessionStillActive,
    /// No administrator permit is on record.
    NotPermitted,
}

impl IssuanceDenial {
    /// Returns the user-facing denial reason.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::SessionStillActive => "session still active",
            Self::NotPermitted => "not permitted",
        }
    }
}

impl From<IssuanceDenial> for AppError {
    fn from(value: IssuanceDenial) -> Self {
        AppError::Forbidden(value.message().to_owned())
    }
}

/// Result of an issuance check for one role and principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceCheck {
    /// Liveness of the principal's latest session.
    pub liveness: SessionLiveness,
    /// Whether a new session may be requested now.
    pub permitted: bool,
}

impl IssuanceCheck {
    /// Returns why issuance is refused, if it is.
    #[must_use]
    pub fn denial(&self) -> Option<IssuanceDenial> {
        if self.liveness == SessionLiveness::Active {
            return Some(IssuanceDenial::SessionStillActive);
        }

        (!self.permitted).then_some(IssuanceDenial::NotPermitted)
    }
}

/// One issued session in a role's assume history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumeSession {
    #[serde(alias = "user")]
    principal: String,
    #[serde(alias = "timestamp")]
    issued_at: DateTime<Utc>,
    #[serde(alias = "expiration")]
    expires_at: DateTime<Utc>,
}

impl AssumeSession {
    /// Creates a history entry spanning `duration_seconds` from `issued_at`.
    pub fn new(
        principal: impl Into<String>,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<Self> {
        if duration_seconds == 0 {
            return Err(AppError::Validation(
                "session duration must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            principal: principal.into(),
            issued_at,
            expires_at: issued_at + Duration::seconds(i64::from(duration_seconds)),
        })
    }

    /// Returns the principal that received the session.
    #[must_use]
    pub fn principal(&self) -> &str {
        self.principal.as_str()
    }

    /// Returns the issuance timestamp.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns whether the session is still valid at `now`.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Per-role assume bookkeeping: live holders, issuance history, permission flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumeTracking {
    #[serde(default)]
    assumed_users: BTreeSet<String>,
    #[serde(default)]
    assume_history: Vec<AssumeSession>,
    #[serde(default)]
    assume_permission: BTreeMap<String, AssumePermission>,
}

impl AssumeTracking {
    /// Rebuilds tracking state from its stored parts.
    #[must_use]
    pub fn from_parts(
        assumed_users: BTreeSet<String>,
        assume_history: Vec<AssumeSession>,
        assume_permission: BTreeMap<String, AssumePermission>,
    ) -> Self {
        Self {
            assumed_users,
            assume_history,
            assume_permission,
        }
    }

    /// Returns principals holding an issued session.
    #[must_use]
    pub fn assumed_users(&self) -> &BTreeSet<String> {
        &self.assumed_users
    }

    /// Returns the issuance history in append order.
    #[must_use]
    pub fn assume_history(&self) -> &[AssumeSession] {
        self.assume_history.as_slice()
    }

    /// Returns all stored permission flags.
    #[must_use]
    pub fn assume_permission(&self) -> &BTreeMap<String, AssumePermission> {
        &self.assume_permission
    }

    /// Returns the stored flag for a principal; missing entries read as consumed.
    #[must_use]
    pub fn permission_for(&self, principal: &str) -> AssumePermission {
        self.assume_permission
            .get(principal)
            .copied()
            .unwrap_or_default()
    }

    /// Returns the most recently appended session of a principal.
    #[must_use]
    pub fn latest_session(&self, principal: &str) -> Option<&AssumeSession> {
        self.assume_history
            .iter()
            .rev()
            .find(|session| session.principal == principal)
    }

    /// Classifies the principal's latest session against `now`.
    #[must_use]
    pub fn liveness(&self, principal: &str, now: DateTime<Utc>) -> SessionLiveness {
        match self.latest_session(principal) {
            None => SessionLiveness::NoHistory,
            Some(session) if session.is_live_at(now) => SessionLiveness::Active,
            Some(_) => SessionLiveness::Expired,
        }
    }

    /// Decides whether a new session may be issued to the principal.
    #[must_use]
    pub fn check_issuance(&self, principal: &str, now: DateTime<Utc>) -> IssuanceCheck {
        let liveness = self.liveness(principal, now);
        let permitted = liveness != SessionLiveness::Active
            && self.permission_for(principal) == AssumePermission::Permit;

        IssuanceCheck {
            liveness,
            permitted,
        }
    }

    /// Records a new session and consumes the principal's permit.
    pub fn record_issuance(
        &mut self,
        principal: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        let session = AssumeSession::new(principal, issued_at, duration_seconds)?;

        self.assume_history.push(session.clone());
        self.assumed_users.insert(principal.to_owned());
        self.assume_permission
            .insert(principal.to_owned(), AssumePermission::Consumed);

        Ok(session)
    }

    /// Checks issuance and, when it is allowed, records the session in the same step.
    ///
    /// A denied check fails with `AppError::Forbidden` and leaves tracking untouched.
    pub fn reserve_issuance(
        &mut self,
        principal: &str,
        issued_at: DateTime<Utc>,
        duration_seconds: u32,
    ) -> AppResult<AssumeSession> {
        if let Some(denial) = self.check_issuance(principal, issued_at).denial() {
            return Err(denial.into());
        }

        self.record_issuance(principal, issued_at, duration_seconds)
    }

    /// Withdraws a reserved session and gives the principal its permit back.
    ///
    /// Returns `false` and changes nothing when the session is no longer on record.
    pub fn release_issuance(&mut self, session: &AssumeSession) -> bool {
        let Some(index) = self
            .assume_history
            .iter()
            .rposition(|entry| entry == session)
        else {
            return false;
        };

        self.assume_history.remove(index);
        let principal = session.principal();
        if !self
            .assume_history
            .iter()
            .any(|entry| entry.principal == principal)
        {
            self.assumed_users.remove(principal);
        }
        self.assume_permission
            .insert(principal.to_owned(), AssumePermission::Permit);

        true
    }

    /// Stores a permission flag; a permit also clears the principal's sessions.
    pub fn set_permission(&mut self, principal: &str, value: AssumePermission) {
        if value == AssumePermission::Permit {
            self.assumed_users.remove(principal);
            self.assume_history
                .retain(|session| session.principal != principal);
        }

        self.assume_permission.insert(principal.to_owned(), value);
    }
}
