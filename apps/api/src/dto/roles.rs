use std::collections::BTreeMap;

use rolegate_application::{PrincipalPermission, PrincipalRoleView, RolePermissionOverview};
use rolegate_domain::{AssumeSession, IssuanceCheck, RoleRecord};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::format_timestamp;

/// API representation of one recorded session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assume-session-response.ts"
)]
pub struct AssumeSessionResponse {
    pub principal: String,
    pub issued_at: String,
    pub expires_at: String,
}

impl From<&AssumeSession> for AssumeSessionResponse {
    fn from(value: &AssumeSession) -> Self {
        Self {
            principal: value.principal().to_owned(),
            issued_at: format_timestamp(value.issued_at()),
            expires_at: format_timestamp(value.expires_at()),
        }
    }
}

/// API representation of a stored role record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-record-response.ts"
)]
pub struct RoleRecordResponse {
    pub role_name: String,
    pub role_arn: String,
    pub create_date: String,
    pub max_session_duration: u32,
    pub principal: Vec<String>,
    pub assumed_users: Vec<String>,
    pub assume_history: Vec<AssumeSessionResponse>,
    pub assume_permission: BTreeMap<String, String>,
}

impl From<RoleRecord> for RoleRecordResponse {
    fn from(value: RoleRecord) -> Self {
        let tracking = value.tracking();

        Self {
            role_name: value.role_name().to_owned(),
            role_arn: value.role_arn().to_owned(),
            create_date: format_timestamp(value.create_date()),
            max_session_duration: value.max_session_duration(),
            principal: value.principal().to_vec(),
            assumed_users: tracking.assumed_users().iter().cloned().collect(),
            assume_history: tracking
                .assume_history()
                .iter()
                .map(AssumeSessionResponse::from)
                .collect(),
            assume_permission: tracking
                .assume_permission()
                .iter()
                .map(|(principal, permission)| (principal.clone(), permission.as_str().to_owned()))
                .collect(),
        }
    }
}

/// Incoming payload for an administrator permission reset.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-permission-request.ts"
)]
pub struct UpdatePermissionRequest {
    pub role_arn: String,
    pub principal_arn: String,
    pub value: String,
}

/// Tracker decision for one role and principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/issuance-check-response.ts"
)]
pub struct IssuanceCheckResponse {
    pub role_arn: String,
    pub principal_arn: String,
    pub liveness: String,
    pub permitted: bool,
    pub reason: Option<String>,
}

impl IssuanceCheckResponse {
    pub fn new(role_arn: String, principal_arn: String, check: IssuanceCheck) -> Self {
        Self {
            role_arn,
            principal_arn,
            liveness: check.liveness.as_str().to_owned(),
            permitted: check.permitted,
            reason: check.denial().map(|denial| denial.message().to_owned()),
        }
    }
}

/// Role a principal may assume, with its current issuance state.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-role-response.ts"
)]
pub struct PrincipalRoleResponse {
    pub role_name: String,
    pub role_arn: String,
    pub max_session_duration: u32,
    pub liveness: String,
    pub permitted: bool,
    pub latest_session: Option<AssumeSessionResponse>,
}

/// Roles assumable by one principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-roles-response.ts"
)]
pub struct PrincipalRolesResponse {
    pub principal_arn: String,
    pub roles: Vec<PrincipalRoleResponse>,
}

impl PrincipalRolesResponse {
    pub fn new(principal_arn: String, views: Vec<PrincipalRoleView>) -> Self {
        let roles = views
            .into_iter()
            .map(|view| PrincipalRoleResponse {
                role_name: view.record.role_name().to_owned(),
                role_arn: view.record.role_arn().to_owned(),
                max_session_duration: view.record.max_session_duration(),
                liveness: view.check.liveness.as_str().to_owned(),
                permitted: view.check.permitted,
                latest_session: view
                    .record
                    .tracking()
                    .latest_session(principal_arn.as_str())
                    .map(AssumeSessionResponse::from),
            })
            .collect();

        Self {
            principal_arn,
            roles,
        }
    }
}

/// Permission flag of one principal on one role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/principal-permission-response.ts"
)]
pub struct PrincipalPermissionResponse {
    pub principal_arn: String,
    pub permission: String,
    pub liveness: String,
}

impl From<PrincipalPermission> for PrincipalPermissionResponse {
    fn from(value: PrincipalPermission) -> Self {
        Self {
            principal_arn: value.principal_arn,
            permission: value.permission.as_str().to_owned(),
            liveness: value.liveness.as_str().to_owned(),
        }
    }
}

/// Administrative permission view of one role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-permission-overview-response.ts"
)]
pub struct RolePermissionOverviewResponse {
    pub role_arn: String,
    pub role_name: String,
    pub principals: Vec<PrincipalPermissionResponse>,
}

impl From<RolePermissionOverview> for RolePermissionOverviewResponse {
    fn from(value: RolePermissionOverview) -> Self {
        Self {
            role_arn: value.role_arn,
            role_name: value.role_name,
            principals: value
                .principals
                .into_iter()
                .map(PrincipalPermissionResponse::from)
                .collect(),
        }
    }
}
