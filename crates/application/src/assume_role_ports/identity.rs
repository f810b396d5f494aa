use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rolegate_core::{AppResult, ClientContext};
use rolegate_domain::ProviderRole;

/// Input for one temporary-credential request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    /// Role to assume.
    pub role_arn: String,
    /// Session name reported to the provider.
    pub session_name: String,
    /// Requested lifetime in seconds.
    pub duration_seconds: u32,
}

/// Short-lived credential triple returned by the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
    /// Temporary access key id.
    pub access_key_id: String,
    /// Temporary secret access key.
    pub secret_access_key: String,
    /// Session token bound to the temporary keys.
    pub session_token: String,
    /// Provider-reported expiry.
    pub expires_at: DateTime<Utc>,
}

impl Debug for IssuedCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("IssuedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Port for the external identity provider (IAM/STS-compatible).
///
/// Implementations map every provider failure to `AppError::IdentityProvider`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the principal identifier behind the caller's long-lived keys.
    async fn resolve_principal(&self, client: &ClientContext) -> AppResult<String>;

    /// Requests temporary credentials for a role.
    async fn assume_role(
        &self,
        client: &ClientContext,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials>;

    /// Lists every role visible to the caller, with trust-policy principals.
    async fn list_roles(&self, client: &ClientContext) -> AppResult<Vec<ProviderRole>>;
}
