use rolegate_application::{IssuedSession, RoleSyncSummary};
use rolegate_core::{AppResult, ClientContext};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::format_timestamp;

/// Long-lived caller credentials for provider-backed operations.
#[derive(Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/client-credentials-request.ts"
)]
pub struct ClientCredentialsRequest {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub region: Option<String>,
}

impl ClientCredentialsRequest {
    pub fn into_client(self) -> AppResult<ClientContext> {
        ClientContext::new(
            self.access_key,
            self.secret_key,
            self.endpoint.as_str(),
            self.region.as_deref(),
        )
    }
}

/// Incoming payload for temporary credential issuance.
#[derive(Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/issue-session-request.ts"
)]
pub struct IssueSessionRequest {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub region: Option<String>,
    pub role_arn: String,
    pub duration_seconds: Option<u32>,
}

impl IssueSessionRequest {
    pub fn client(&self) -> AppResult<ClientContext> {
        ClientContext::new(
            self.access_key.as_str(),
            self.secret_key.as_str(),
            self.endpoint.as_str(),
            self.region.as_deref(),
        )
    }
}

/// Temporary credentials returned to the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/issued-session-response.ts"
)]
pub struct IssuedSessionResponse {
    pub role_arn: String,
    pub principal_arn: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: String,
    pub issued_at: String,
    pub expires_at: String,
}

impl From<IssuedSession> for IssuedSessionResponse {
    fn from(value: IssuedSession) -> Self {
        Self {
            issued_at: format_timestamp(value.session.issued_at()),
            expires_at: format_timestamp(value.session.expires_at()),
            role_arn: value.role_arn,
            principal_arn: value.principal_arn,
            access_key_id: value.credentials.access_key_id,
            secret_access_key: value.credentials.secret_access_key,
            session_token: value.credentials.session_token,
            expiration: format_timestamp(value.credentials.expires_at),
        }
    }
}

/// Outcome of a role synchronization request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-sync-response.ts"
)]
pub struct RoleSyncResponse {
    pub synchronized: usize,
    pub skipped: usize,
}

impl From<RoleSyncSummary> for RoleSyncResponse {
    fn from(value: RoleSyncSummary) -> Self {
        Self {
            synchronized: value.synchronized,
            skipped: value.skipped,
        }
    }
}
